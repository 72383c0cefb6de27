//! Encoder configuration.
use core::any::Any;
use core::fmt;
use std::collections::BTreeMap;

/// Nesting limit used by [`Config::default`]
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// An opaque bag of application values, keyed by name.
///
/// The encoder never looks inside; [`Encode`](crate::Encode) implementations read it through
/// [`Encoder::user_info`](crate::Encoder::user_info) to customize their own output.
#[derive(Default)]
pub struct UserInfo {
    entries: BTreeMap<String, Box<dyn Any + Send + Sync>>,
}

impl UserInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning `true` if an older value was replaced.
    pub fn insert<K, T>(&mut self, key: K, value: T) -> bool
        where K: Into<String>, T: Any + Send + Sync
    {
        self.entries.insert(key.into(), Box::new(value)).is_some()
    }

    /// Look up the value under `key`, if it is a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

/// Passed unchanged from [`encode`](crate::encode) to every [`Encoder`](crate::Encoder).
///
/// Nothing in here changes the produced bytes.
#[derive(Debug)]
pub struct Config {
    user_info: UserInfo,
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { user_info: UserInfo::new(), max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how deep the encoded value graph may nest before encoding fails with
    /// [`ErrorKind::DepthLimitExceeded`](crate::ErrorKind::DepthLimitExceeded).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = user_info;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn user_info_mut(&mut self) -> &mut UserInfo {
        &mut self.user_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info() {
        let mut info = UserInfo::new();
        assert!(info.is_empty());
        assert!(!info.insert("units", "metric"));
        assert!(!info.insert("version", 3u32));
        assert!(info.insert("version", 4u32));
        assert_eq!(info.len(), 2);
        assert_eq!(info.get::<u32>("version"), Some(&4));
        assert_eq!(info.get::<&str>("units"), Some(&"metric"));
        assert_eq!(info.get::<String>("units"), None);
        assert_eq!(info.get::<u32>("missing"), None);
        assert!(info.contains_key("units"));
        assert!(info.remove("units"));
        assert!(!info.contains_key("units"));
        assert_eq!(format!("{:?}", info), r#"{"version"}"#);
    }

    #[test]
    fn test_config() {
        let config = Config::default();
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(config.user_info().is_empty());
        let mut info = UserInfo::new();
        info.insert("verbose", true);
        let mut config = Config::new().with_max_depth(3).with_user_info(info);
        assert_eq!(config.max_depth(), 3);
        config.user_info_mut().insert("extra", 1u8);
        assert_eq!(config.user_info().get::<bool>("verbose"), Some(&true));
        assert_eq!(config.user_info().len(), 2);
    }
}
