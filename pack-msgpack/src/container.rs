//! Containers under construction and the encoded values they hold.
use core::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use pack_write::PackWrite;

use crate::codec::CodecResult;
use crate::error::ErrorKind;
use crate::magick::FIXMAP;

/// The bytes of one complete MessagePack item: a scalar or a closed container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedValue(Vec<u8>);

impl EncodedValue {
    /// Build a value by running a codec function on a fresh buffer.
    pub fn build<F>(f: F) -> CodecResult<Self>
        where F: FnOnce(&mut Vec<u8>) -> CodecResult<()>
    {
        let mut bytes = Vec::new();
        f(&mut bytes)?;
        Ok(EncodedValue(bytes))
    }

    /// Wrap bytes that already hold exactly one MessagePack item.
    ///
    /// The bytes are copied to the output verbatim; nothing checks they are well formed.
    pub fn from_msgpack_unchecked(bytes: Vec<u8>) -> Self {
        EncodedValue(bytes)
    }

    /// An empty map, `0x80`
    pub fn empty_map() -> Self {
        EncodedValue(vec![FIXMAP])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub(crate) fn write_to<W: PackWrite>(&self, output: &mut W) -> CodecResult<()> {
        Ok(output.write(&self.0)?)
    }
}

impl AsRef<[u8]> for EncodedValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A place for one value in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Filled(EncodedValue),
    /// Reserved by a deferred sub-encoder that hasn't committed yet
    Pending,
}

impl Slot {
    pub(crate) fn fill(&mut self, value: EncodedValue) -> CodecResult<()> {
        match self {
            Slot::Pending => {
                *self = Slot::Filled(value);
                Ok(())
            }
            Slot::Filled(_) => Err(ErrorKind::DeferredSlotDoubleCommit)
        }
    }

    /// A reservation never committed to ends up as an empty map.
    pub(crate) fn write_to<W: PackWrite>(&self, output: &mut W) -> CodecResult<()> {
        match self {
            Slot::Filled(value) => value.write_to(output),
            Slot::Pending => Ok(output.write_byte(FIXMAP)?)
        }
    }
}

/// Identity of a container under construction.
///
/// A deferred value can only be committed to the container that reserved its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContainerId(u64);

impl ContainerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ContainerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A map under construction, keeping the insertion order of its keys.
#[derive(Debug, Clone)]
pub(crate) struct MapBuilder {
    id: ContainerId,
    entries: IndexMap<String, Slot>,
}

impl Default for MapBuilder {
    fn default() -> Self {
        MapBuilder { id: ContainerId::next(), entries: IndexMap::new() }
    }
}

impl MapBuilder {
    pub(crate) fn id(&self) -> ContainerId {
        self.id
    }

    /// Insert or replace the value under `key`. A replaced key keeps its original position.
    pub(crate) fn insert(&mut self, key: String, value: EncodedValue) {
        self.entries.insert(key, Slot::Filled(value));
    }

    pub(crate) fn reserve(&mut self, key: String) {
        self.entries.insert(key, Slot::Pending);
    }

    pub(crate) fn fill(&mut self, key: &str, value: EncodedValue) -> CodecResult<()> {
        match self.entries.get_mut(key) {
            Some(slot) => slot.fill(value),
            None => Err(ErrorKind::InvalidTraversal("no slot reserved under this key"))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(key, slot)| (key.as_str(), slot))
    }
}

/// A sequence under construction.
#[derive(Debug, Clone)]
pub(crate) struct SeqBuilder {
    id: ContainerId,
    items: Vec<Slot>,
}

impl Default for SeqBuilder {
    fn default() -> Self {
        SeqBuilder { id: ContainerId::next(), items: Vec::new() }
    }
}

impl SeqBuilder {
    pub(crate) fn id(&self) -> ContainerId {
        self.id
    }

    pub(crate) fn push(&mut self, value: EncodedValue) {
        self.items.push(Slot::Filled(value));
    }

    /// Reserve the next index and return it.
    pub(crate) fn reserve(&mut self) -> usize {
        self.items.push(Slot::Pending);
        self.items.len() - 1
    }

    pub(crate) fn fill(&mut self, index: usize, value: EncodedValue) -> CodecResult<()> {
        match self.items.get_mut(index) {
            Some(slot) => slot.fill(value),
            None => Err(ErrorKind::InvalidTraversal("no slot reserved at this index"))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[Slot] {
        &self.items
    }
}

/// The single thing an encoding context produces.
#[derive(Debug, Clone)]
pub(crate) enum Artifact {
    Map(MapBuilder),
    Seq(SeqBuilder),
    Scalar(EncodedValue),
}
