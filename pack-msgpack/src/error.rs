//! Encoding errors and the coding path they occurred at.
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use pack_write::WriteError;
use thiserror::Error;

/// Encoding result
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// One step of a [`Path`]: a map key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, ".{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Position of an encoding context within the encoded value graph.
///
/// Displayed as `$` followed by its segments, e.g. `$.user.tags[2]`.
/// A child path shares its parent's segments, so extending a path never copies them.
#[derive(Clone, Default)]
pub struct Path(Option<Arc<PathNode>>);

struct PathNode {
    parent: Path,
    segment: PathSegment,
    depth: usize,
}

impl Path {
    /// The path of the top-level value
    pub fn root() -> Self {
        Path(None)
    }

    /// Return this path extended by `segment`
    pub fn child(&self, segment: PathSegment) -> Self {
        let depth = self.depth() + 1;
        Path(Some(Arc::new(PathNode { parent: self.clone(), segment, depth })))
    }

    /// Nesting depth, `0` at the root
    pub fn depth(&self) -> usize {
        self.0.as_ref().map_or(0, |node| node.depth)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// The last segment, `None` at the root
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.as_ref().map(|node| &node.segment)
    }

    /// Segments from the root down
    pub fn segments(&self) -> Vec<&PathSegment> {
        let mut segments = Vec::with_capacity(self.depth());
        let mut path = self;
        while let Some(node) = &path.0 {
            segments.push(&node.segment);
            path = &node.parent;
        }
        segments.reverse();
        segments
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        if a.depth() != b.depth() {
            return false
        }
        loop {
            match (&a.0, &b.0) {
                (Some(x), Some(y)) => {
                    if Arc::ptr_eq(x, y) {
                        return true
                    }
                    if x.segment != y.segment {
                        return false
                    }
                    a = &x.parent;
                    b = &y.parent;
                }
                _ => return true
            }
        }
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments().hash(state)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Path").field(&self.segments()).finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in self.segments() {
            segment.fmt(f)?;
        }
        Ok(())
    }
}

/// A value that does not fit in any MessagePack representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unrepresentable {
    /// UTF-8 length of a string above `u32::MAX`
    Str(usize),
    /// Length of a byte blob above `u32::MAX`
    Bin(usize),
    /// Number of sequence elements above `u32::MAX`
    Array(usize),
    /// Number of map entries above `u32::MAX`
    Map(usize),
    /// An integer wider than 64 bits
    Integer,
    /// Seconds since the Unix epoch outside of the 32-bit timestamp range
    Timestamp(i64),
}

impl fmt::Display for Unrepresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unrepresentable::Str(len) => write!(f, "string of {} bytes is too long", len),
            Unrepresentable::Bin(len) => write!(f, "binary of {} bytes is too long", len),
            Unrepresentable::Array(len) => write!(f, "array of {} elements is too long", len),
            Unrepresentable::Map(len) => write!(f, "map of {} entries is too large", len),
            Unrepresentable::Integer => f.write_str("integer does not fit in 64 bits"),
            Unrepresentable::Timestamp(secs) => write!(f, "timestamp {}s is out of the 32-bit range", secs),
        }
    }
}

/// What went wrong, without the location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Content exceeding the widest MessagePack tier
    #[error("unrepresentable value: {0}")]
    UnrepresentableValue(Unrepresentable),
    /// A shape was declared twice on the same context or containers were mixed up
    #[error("invalid traversal: {0}")]
    InvalidTraversal(&'static str),
    /// A deferred slot received its value more than once
    #[error("deferred slot committed more than once")]
    DeferredSlotDoubleCommit,
    /// The value graph nests deeper than [`Config::max_depth`](crate::Config::max_depth)
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
    /// A serde map key that can't be turned into text
    #[error("map key must be text")]
    KeyMustBeText,
    /// An error passed down from a [`serde::ser::Serialize`] implementation
    #[error("{0}")]
    Custom(String),
    /// The output sink rejected the encoded bytes
    #[error("writer error: {0}")]
    Writer(#[from] WriteError),
}

impl From<Unrepresentable> for ErrorKind {
    fn from(value: Unrepresentable) -> Self {
        ErrorKind::UnrepresentableValue(value)
    }
}

/// Encoding error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {path}")]
pub struct Error {
    kind: ErrorKind,
    path: Path,
}

impl Error {
    pub fn new(kind: ErrorKind, path: Path) -> Self {
        Error { kind, path }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where in the value graph the error was raised
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// `true` for content that a caller may truncate or reject and retry
    pub fn is_unrepresentable(&self) -> bool {
        matches!(self.kind, ErrorKind::UnrepresentableValue(_))
    }

    /// `true` for broken [`Encode`](crate::Encode) implementations
    pub fn is_contract_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidTraversal(_) | ErrorKind::DeferredSlotDoubleCommit)
    }

    /// Locate an error raised without a path (e.g. by a serde impl) at `path`.
    pub(crate) fn or_at(mut self, path: &Path) -> Self {
        if self.path.is_root() {
            self.path = path.clone();
        }
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind, Path::root())
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        ErrorKind::Writer(err).into()
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
        where T: fmt::Display
    {
        ErrorKind::Custom(msg.to_string()).into()
    }
}
