//! Scalar wrappers for values without a natural Rust counterpart in MessagePack.
use std::time::{SystemTime, UNIX_EPOCH};

/// A byte blob, encoded as MessagePack `bin` instead of an array of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binary<'a>(pub &'a [u8]);

impl<'a> From<&'a [u8]> for Binary<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Binary(bytes)
    }
}

impl AsRef<[u8]> for Binary<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0
    }
}

/// A point in time with a whole-second resolution, encoded as a 32-bit MessagePack timestamp.
///
/// Only instants from the Unix epoch up to 2106-02-07 fit in the encoding; the rest
/// fail with [`Unrepresentable::Timestamp`](crate::Unrepresentable::Timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    unix_secs: i64,
}

impl Timestamp {
    pub const fn from_unix_secs(unix_secs: i64) -> Self {
        Timestamp { unix_secs }
    }

    /// Seconds since the Unix epoch, negative for earlier instants
    pub const fn unix_secs(&self) -> i64 {
        self.unix_secs
    }

    pub fn now() -> Self {
        SystemTime::now().into()
    }
}

impl From<SystemTime> for Timestamp {
    /// Sub-second precision is truncated toward the past.
    fn from(time: SystemTime) -> Self {
        let unix_secs = match time.duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
            Err(err) => {
                let before = err.duration();
                let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
                if before.subsec_nanos() == 0 { -secs } else { -secs - 1 }
            }
        };
        Timestamp { unix_secs }
    }
}
