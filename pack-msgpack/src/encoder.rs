//! The traversal engine: encoding contexts and the container handles they give out.
use pack_write::PackWrite;
use tracing::{debug, trace};

use crate::assemble;
use crate::codec::{self, CodecResult};
use crate::config::{Config, UserInfo};
use crate::container::{Artifact, ContainerId, EncodedValue, MapBuilder, SeqBuilder};
use crate::deferred::{self, Deferred, SlotRef};
use crate::error::{Error, ErrorKind, Path, PathSegment, Result};
use crate::types::Timestamp;

const ALREADY_ENCODED: &str = "a value was already encoded at this path";
const SHAPE_MISMATCH: &str = "a container of a different kind was already opened at this path";

/// A value that knows how to describe itself to an [`Encoder`].
///
/// An implementation declares exactly one shape: it opens a map ([`Encoder::open_map`]),
/// opens a sequence ([`Encoder::open_seq`]) or encodes a single scalar (`Encoder::encode_*`).
/// Nested values are handed to the container, which encodes each one in a context of its own.
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()>;
}

/// Encode `value` into a new vector of bytes.
///
/// Nothing is returned unless the whole value was encoded.
pub fn encode<T>(value: &T, config: &Config) -> Result<Vec<u8>>
    where T: Encode + ?Sized
{
    let mut encoder = Encoder::root(config);
    value.encode(&mut encoder)?;
    let mut output = Vec::new();
    assemble::assemble(encoder.artifact.as_ref(), &mut output)
        .map_err(|kind| Error::new(kind, Path::root()))?;
    debug!(target: "pack_msgpack", bytes = output.len(), "value encoded");
    Ok(output)
}

/// Encode `value` with a default [`Config`].
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
    where T: Encode + ?Sized
{
    encode(value, &Config::default())
}

/// Encode `value` and write it to a [`PackWrite`] implementation with a single write.
///
/// The value is fully encoded before the writer is touched, so an encoding error never
/// leaves a partial message behind.
pub fn to_writer<W, T>(mut writer: W, value: &T, config: &Config) -> Result<()>
    where W: PackWrite, T: Encode + ?Sized
{
    let bytes = encode(value, config)?;
    writer.write(&bytes).map_err(Error::from)
}

/// An encoding context: one level of the value graph.
///
/// A context produces exactly one artifact: a map, a sequence or a scalar. A context left
/// untouched encodes as an empty map.
#[derive(Debug)]
pub struct Encoder<'c> {
    config: &'c Config,
    path: Path,
    artifact: Option<Artifact>,
}

impl<'c> Encoder<'c> {
    pub(crate) fn root(config: &'c Config) -> Self {
        Encoder { config, path: Path::root(), artifact: None }
    }

    /// A fresh context one level below `parent`.
    pub(crate) fn nested(config: &'c Config, parent: &Path, segment: PathSegment) -> Result<Self> {
        let path = parent.child(segment);
        if path.depth() > config.max_depth() {
            return Err(Error::new(ErrorKind::DepthLimitExceeded(config.max_depth()), path))
        }
        trace!(target: "pack_msgpack", path = %path, "context opened");
        Ok(Encoder { config, path, artifact: None })
    }

    /// Close this context into a single value, an empty map if nothing was encoded.
    pub(crate) fn finish(self) -> Result<EncodedValue> {
        trace!(target: "pack_msgpack", path = %self.path, "context closed");
        let Encoder { path, artifact, .. } = self;
        assemble::pop(artifact).map_err(|kind| Error::new(kind, path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &'c Config {
        self.config
    }

    /// The application values passed down from [`encode`].
    pub fn user_info(&self) -> &'c UserInfo {
        self.config.user_info()
    }

    /// `true` once a map, a sequence or a scalar was declared here
    pub fn has_value(&self) -> bool {
        self.artifact.is_some()
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.path.clone())
    }

    fn declare_scalar<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut Vec<u8>) -> CodecResult<()>
    {
        if self.artifact.is_some() {
            return Err(self.error(ErrorKind::InvalidTraversal(ALREADY_ENCODED)))
        }
        let value = EncodedValue::build(f).map_err(|kind| self.error(kind))?;
        self.artifact = Some(Artifact::Scalar(value));
        Ok(())
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        self.declare_scalar(codec::write_nil)
    }

    pub fn encode_bool(&mut self, v: bool) -> Result<()> {
        self.declare_scalar(|w| codec::write_bool(w, v))
    }

    pub fn encode_i64(&mut self, v: i64) -> Result<()> {
        self.declare_scalar(|w| codec::write_int(w, v))
    }

    pub fn encode_u64(&mut self, v: u64) -> Result<()> {
        self.declare_scalar(|w| codec::write_uint(w, v))
    }

    pub fn encode_i128(&mut self, v: i128) -> Result<()> {
        self.declare_scalar(|w| codec::write_i128(w, v))
    }

    pub fn encode_u128(&mut self, v: u128) -> Result<()> {
        self.declare_scalar(|w| codec::write_u128(w, v))
    }

    pub fn encode_f32(&mut self, v: f32) -> Result<()> {
        self.declare_scalar(|w| codec::write_f32(w, v))
    }

    pub fn encode_f64(&mut self, v: f64) -> Result<()> {
        self.declare_scalar(|w| codec::write_f64(w, v))
    }

    pub fn encode_str(&mut self, v: &str) -> Result<()> {
        self.declare_scalar(|w| codec::write_str(w, v))
    }

    pub fn encode_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.declare_scalar(|w| codec::write_bin(w, v))
    }

    pub fn encode_timestamp(&mut self, v: Timestamp) -> Result<()> {
        self.declare_scalar(|w| codec::write_timestamp(w, v.unix_secs()))
    }

    /// Declare an already encoded item as this context's scalar.
    pub fn encode_raw(&mut self, v: EncodedValue) -> Result<()> {
        if self.artifact.is_some() {
            return Err(self.error(ErrorKind::InvalidTraversal(ALREADY_ENCODED)))
        }
        self.artifact = Some(Artifact::Scalar(v));
        Ok(())
    }

    /// Let `value` describe itself in this context.
    ///
    /// Fails if this context already holds a value.
    pub fn encode_value<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.artifact.is_some() {
            return Err(self.error(ErrorKind::InvalidTraversal(ALREADY_ENCODED)))
        }
        value.encode(self)
    }

    /// Declare a map, or get back the map already opened here.
    pub fn open_map(&mut self) -> Result<MapEncoder<'_, 'c>> {
        if self.artifact.is_none() {
            trace!(target: "pack_msgpack", path = %self.path, "map opened");
        }
        let artifact = self.artifact.get_or_insert_with(|| Artifact::Map(MapBuilder::default()));
        match artifact {
            Artifact::Map(map) => Ok(MapEncoder { map, path: &self.path, config: self.config }),
            _ => Err(Error::new(ErrorKind::InvalidTraversal(SHAPE_MISMATCH), self.path.clone()))
        }
    }

    /// Declare a sequence, or get back the sequence already opened here.
    pub fn open_seq(&mut self) -> Result<SeqEncoder<'_, 'c>> {
        if self.artifact.is_none() {
            trace!(target: "pack_msgpack", path = %self.path, "sequence opened");
        }
        let artifact = self.artifact.get_or_insert_with(|| Artifact::Seq(SeqBuilder::default()));
        match artifact {
            Artifact::Seq(seq) => Ok(SeqEncoder { seq, path: &self.path, config: self.config }),
            _ => Err(Error::new(ErrorKind::InvalidTraversal(SHAPE_MISMATCH), self.path.clone()))
        }
    }
}

/// Run `f` in a fresh context below `parent` and close it into a value.
fn encode_nested<'c, F>(config: &'c Config, parent: &Path, segment: PathSegment, f: F) -> Result<EncodedValue>
    where F: FnOnce(&mut Encoder<'c>) -> Result<()>
{
    let mut encoder = Encoder::nested(config, parent, segment)?;
    f(&mut encoder)?;
    encoder.finish()
}

fn check_owner(deferred: &Deferred<'_>, container: ContainerId, path: &Path) -> Result<()> {
    if deferred.owner() == container {
        return Ok(())
    }
    Err(Error::new(ErrorKind::InvalidTraversal(deferred::FOREIGN_SLOT),
                   path.child(PathSegment::from(deferred.slot()))))
}

/// A handle to the map of an [`Encoder`].
///
/// Entries are written in the order their keys were first inserted.
#[derive(Debug)]
pub struct MapEncoder<'a, 'c> {
    map: &'a mut MapBuilder,
    path: &'a Path,
    config: &'c Config,
}

impl<'a, 'c> MapEncoder<'a, 'c> {
    /// Encode `value` under `key`. An existing key gets its value replaced in place.
    pub fn put<T: Encode + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        self.put_with(key, |encoder| value.encode(encoder))
    }

    /// Encode whatever `f` declares on a fresh context under `key`.
    pub fn put_with<F>(&mut self, key: &str, f: F) -> Result<()>
        where F: FnOnce(&mut Encoder<'c>) -> Result<()>
    {
        let value = encode_nested(self.config, self.path, PathSegment::Key(key.to_owned()), f)?;
        self.map.insert(key.to_owned(), value);
        Ok(())
    }

    pub fn put_nil(&mut self, key: &str) -> Result<()> {
        self.put_with(key, |encoder| encoder.encode_nil())
    }

    /// Insert an already encoded item under `key`.
    pub fn put_raw(&mut self, key: &str, value: EncodedValue) {
        self.map.insert(key.to_owned(), value);
    }

    /// Open a map under `key` and let `f` fill it.
    pub fn nested_map<F>(&mut self, key: &str, f: F) -> Result<()>
        where F: FnOnce(&mut MapEncoder<'_, 'c>) -> Result<()>
    {
        self.put_with(key, |encoder| f(&mut encoder.open_map()?))
    }

    /// Open a sequence under `key` and let `f` fill it.
    pub fn nested_seq<F>(&mut self, key: &str, f: F) -> Result<()>
        where F: FnOnce(&mut SeqEncoder<'_, 'c>) -> Result<()>
    {
        self.put_with(key, |encoder| f(&mut encoder.open_seq()?))
    }

    /// Reserve `key` for a value supplied later through the returned [`Deferred`].
    ///
    /// The key takes its position in the map now. Hand the deferred back to
    /// [`commit`](Self::commit) once it is done; a reservation never committed
    /// encodes as an empty map.
    pub fn defer(&mut self, key: &str) -> Result<Deferred<'c>> {
        let encoder = Encoder::nested(self.config, self.path, PathSegment::Key(key.to_owned()))?;
        self.map.reserve(key.to_owned());
        trace!(target: "pack_msgpack", path = %encoder.path(), "deferred slot reserved");
        Ok(Deferred::new(self.map.id(), SlotRef::Key(key.to_owned()), encoder))
    }

    /// Reserve the `"super"` key, where a base type encodes its own part of a value.
    pub fn defer_super(&mut self) -> Result<Deferred<'c>> {
        self.defer(deferred::SUPER_KEY)
    }

    /// Fill the slot reserved by `deferred` with whatever its encoder produced.
    ///
    /// Fails with [`ErrorKind::InvalidTraversal`] if the slot was reserved by another container.
    pub fn commit(&mut self, deferred: Deferred<'c>) -> Result<()> {
        check_owner(&deferred, self.map.id(), self.path)?;
        let (slot, value) = deferred.finish()?;
        match slot {
            SlotRef::Key(key) => self.map.fill(&key, value)
                .map_err(|kind| Error::new(kind, self.path.child(PathSegment::Key(key)))),
            SlotRef::Index(index) => Err(Error::new(
                ErrorKind::InvalidTraversal(deferred::FOREIGN_SLOT),
                self.path.child(PathSegment::Index(index))))
        }
    }

    /// Reserve `key`, let `f` encode into the reservation and commit it.
    ///
    /// The commit happens exactly once, also when `f` fails; `f`'s error is returned then.
    pub fn with_deferred<F>(&mut self, key: &str, f: F) -> Result<()>
        where F: FnOnce(&mut Encoder<'c>) -> Result<()>
    {
        let deferred = self.defer(key)?;
        let (deferred, outcome) = deferred::run(deferred, f);
        let committed = self.commit(deferred);
        outcome.and(committed)
    }

    /// [`with_deferred`](Self::with_deferred) under the `"super"` key.
    pub fn with_super<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut Encoder<'c>) -> Result<()>
    {
        self.with_deferred(deferred::SUPER_KEY, f)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    pub fn user_info(&self) -> &'c UserInfo {
        self.config.user_info()
    }
}

/// A handle to the sequence of an [`Encoder`].
#[derive(Debug)]
pub struct SeqEncoder<'a, 'c> {
    seq: &'a mut SeqBuilder,
    path: &'a Path,
    config: &'c Config,
}

impl<'a, 'c> SeqEncoder<'a, 'c> {
    pub fn append<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.append_with(|encoder| value.encode(encoder))
    }

    /// Append whatever `f` declares on a fresh context.
    pub fn append_with<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut Encoder<'c>) -> Result<()>
    {
        let index = self.seq.len();
        let value = encode_nested(self.config, self.path, PathSegment::Index(index), f)?;
        self.seq.push(value);
        Ok(())
    }

    pub fn append_nil(&mut self) -> Result<()> {
        self.append_with(|encoder| encoder.encode_nil())
    }

    pub fn append_raw(&mut self, value: EncodedValue) {
        self.seq.push(value);
    }

    pub fn nested_map<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut MapEncoder<'_, 'c>) -> Result<()>
    {
        self.append_with(|encoder| f(&mut encoder.open_map()?))
    }

    pub fn nested_seq<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut SeqEncoder<'_, 'c>) -> Result<()>
    {
        self.append_with(|encoder| f(&mut encoder.open_seq()?))
    }

    /// Reserve the next index for a value supplied later through the returned [`Deferred`].
    ///
    /// Elements appended afterwards go after the reserved one.
    pub fn defer(&mut self) -> Result<Deferred<'c>> {
        let index = self.seq.len();
        let encoder = Encoder::nested(self.config, self.path, PathSegment::Index(index))?;
        let index = self.seq.reserve();
        trace!(target: "pack_msgpack", path = %encoder.path(), "deferred slot reserved");
        Ok(Deferred::new(self.seq.id(), SlotRef::Index(index), encoder))
    }

    pub fn commit(&mut self, deferred: Deferred<'c>) -> Result<()> {
        check_owner(&deferred, self.seq.id(), self.path)?;
        let (slot, value) = deferred.finish()?;
        match slot {
            SlotRef::Index(index) => self.seq.fill(index, value)
                .map_err(|kind| Error::new(kind, self.path.child(PathSegment::Index(index)))),
            SlotRef::Key(key) => Err(Error::new(
                ErrorKind::InvalidTraversal(deferred::FOREIGN_SLOT),
                self.path.child(PathSegment::Key(key))))
        }
    }

    /// Reserve the next index, let `f` encode into the reservation and commit it.
    ///
    /// The commit happens exactly once, also when `f` fails.
    pub fn with_deferred<F>(&mut self, f: F) -> Result<()>
        where F: FnOnce(&mut Encoder<'c>) -> Result<()>
    {
        let deferred = self.defer()?;
        let (deferred, outcome) = deferred::run(deferred, f);
        let committed = self.commit(deferred);
        outcome.and(committed)
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.len() == 0
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    pub fn user_info(&self) -> &'c UserInfo {
        self.config.user_info()
    }
}
