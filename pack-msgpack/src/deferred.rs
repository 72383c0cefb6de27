//! Deferred sub-encoders: a slot reserved in a container now and filled later.
use core::fmt;

use tracing::trace;

use crate::container::{ContainerId, EncodedValue};
use crate::encoder::Encoder;
use crate::error::{PathSegment, Result};

pub(crate) const FOREIGN_SLOT: &str = "the slot was reserved by another container";

/// The key under which a base type encodes its own part of a derived value.
pub const SUPER_KEY: &str = "super";

/// Where in its parent container a deferred value goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotRef {
    Key(String),
    Index(usize),
}

impl From<&SlotRef> for PathSegment {
    fn from(slot: &SlotRef) -> Self {
        match slot {
            SlotRef::Key(key) => PathSegment::Key(key.clone()),
            SlotRef::Index(index) => PathSegment::Index(*index)
        }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRef::Key(key) => write!(f, "key {:?}", key),
            SlotRef::Index(index) => write!(f, "index {}", index)
        }
    }
}

/// A sub-encoder bound to a slot reserved in a map or a sequence.
///
/// Obtained from [`MapEncoder::defer`](crate::MapEncoder::defer) or
/// [`SeqEncoder::defer`](crate::SeqEncoder::defer). Encode into [`encoder`](Self::encoder)
/// and give it back to the container's `commit`, which closes the encoder and fills the slot.
/// Dropping it without a commit leaves an empty map in the slot.
#[derive(Debug)]
#[must_use = "a deferred value is only written once it is committed"]
pub struct Deferred<'c> {
    owner: ContainerId,
    slot: SlotRef,
    encoder: Encoder<'c>,
}

impl<'c> Deferred<'c> {
    pub(crate) fn new(owner: ContainerId, slot: SlotRef, encoder: Encoder<'c>) -> Self {
        Deferred { owner, slot, encoder }
    }

    /// The container that reserved the slot
    pub(crate) fn owner(&self) -> ContainerId {
        self.owner
    }

    pub fn slot(&self) -> &SlotRef {
        &self.slot
    }

    pub fn encoder(&mut self) -> &mut Encoder<'c> {
        &mut self.encoder
    }

    pub(crate) fn finish(self) -> Result<(SlotRef, EncodedValue)> {
        let Deferred { slot, encoder, .. } = self;
        let value = encoder.finish()?;
        trace!(target: "pack_msgpack", slot = %slot, bytes = value.len(), "deferred slot committed");
        Ok((slot, value))
    }
}

/// Run `f` on the deferred encoder, handing the deferred back with `f`'s outcome.
pub(crate) fn run<'c, F>(mut deferred: Deferred<'c>, f: F) -> (Deferred<'c>, Result<()>)
    where F: FnOnce(&mut Encoder<'c>) -> Result<()>
{
    let outcome = f(deferred.encoder());
    (deferred, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::encoder::{to_vec, Encode};
    use crate::error::{ErrorKind, Path, PathSegment};

    struct With<F>(F);

    impl<F: Fn(&mut Encoder<'_>) -> Result<()>> Encode for With<F> {
        fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
            (self.0)(encoder)
        }
    }

    #[test]
    fn test_untouched_deferred_is_empty_map() {
        let config = Config::default();
        let encoder = Encoder::nested(&config, &Path::root(), PathSegment::Index(0)).unwrap();
        let deferred = Deferred::new(ContainerId::next(), SlotRef::Index(0), encoder);
        let (slot, value) = deferred.finish().unwrap();
        assert_eq!(slot, SlotRef::Index(0));
        assert_eq!(value.as_bytes(), &[0x80]);
    }

    #[test]
    fn test_defer_and_commit_in_map() {
        let bytes = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let mut deferred = map.defer("first")?;
            assert_eq!(deferred.slot(), &SlotRef::Key("first".into()));
            assert_eq!(deferred.encoder().path().to_string(), "$.first");
            map.put("second", &2u8)?;
            deferred.encoder().encode_u64(1)?;
            map.commit(deferred)
        })).unwrap();
        assert_eq!(bytes, [0x82, 0xa5, b'f', b'i', b'r', b's', b't', 0x01,
                                 0xa6, b's', b'e', b'c', b'o', b'n', b'd', 0x02]);
    }

    #[test]
    fn test_defer_in_seq_keeps_position() {
        let bytes = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut seq = e.open_seq()?;
            seq.append(&1u8)?;
            let mut deferred = seq.defer()?;
            seq.append(&3u8)?;
            deferred.encoder().open_seq()?.append(&2u8)?;
            seq.commit(deferred)
        })).unwrap();
        assert_eq!(bytes, [0x93, 0x01, 0x91, 0x02, 0x03]);
    }

    #[test]
    fn test_uncommitted_slot_is_empty_map() {
        let bytes = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let deferred = map.defer("later")?;
            drop(deferred);
            map.put("now", &true)
        })).unwrap();
        assert_eq!(bytes, [0x82, 0xa5, b'l', b'a', b't', b'e', b'r', 0x80, 0xa3, b'n', b'o', b'w', 0xc3]);
    }

    #[test]
    fn test_double_commit() {
        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let first = map.defer("k")?;
            let second = map.defer("k")?;
            map.commit(first)?;
            map.commit(second)
        })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DeferredSlotDoubleCommit);
        assert_eq!(err.path().to_string(), "$.k");

        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let deferred = map.defer("k")?;
            map.put("k", &1u8)?;
            map.commit(deferred)
        })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DeferredSlotDoubleCommit);
    }

    #[test]
    fn test_commit_to_wrong_container() {
        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let deferred = map.defer("k")?;
            map.nested_seq("xs", |seq| seq.commit(deferred))
        })).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(err.path().to_string(), "$.xs.k");
    }

    #[test]
    fn test_commit_to_another_map() {
        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            let mut outer = map.defer("k")?;
            outer.encoder().encode_u64(7)?;
            map.nested_map("other", |inner| {
                let own = inner.defer("k")?;
                let committed = inner.commit(outer);
                inner.commit(own)?;
                committed
            })
        })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidTraversal(FOREIGN_SLOT));
        assert_eq!(err.path().to_string(), "$.other.k");

        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut seq = e.open_seq()?;
            let first = seq.defer()?;
            seq.nested_seq(|inner| {
                let own = inner.defer()?;
                inner.commit(own)?;
                inner.commit(first)
            })
        })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidTraversal(FOREIGN_SLOT));
        assert_eq!(err.path().to_string(), "$[1][0]");
    }

    #[test]
    fn test_with_super() {
        let bytes = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut map = e.open_map()?;
            map.with_super(|base| base.open_map()?.put("id", &7u8))?;
            map.put("name", "x")
        })).unwrap();
        assert_eq!(bytes, [0x82, 0xa5, b's', b'u', b'p', b'e', b'r', 0x81, 0xa2, b'i', b'd', 0x07,
                                 0xa4, b'n', b'a', b'm', b'e', 0xa1, b'x']);
    }

    #[test]
    fn test_scoped_commit_runs_on_failure() {
        let err = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut seq = e.open_seq()?;
            let failed = seq.with_deferred(|inner| {
                inner.encode_bool(true)?;
                inner.encode_bool(false)
            });
            assert!(failed.is_err());
            // the slot was committed with what was encoded before the failure
            assert_eq!(seq.len(), 1);
            failed
        })).unwrap_err();
        assert_eq!(err.path().to_string(), "$[0]");

        let bytes = to_vec(&With(|e: &mut Encoder<'_>| {
            let mut seq = e.open_seq()?;
            let _ = seq.with_deferred(|inner| {
                inner.encode_bool(true)?;
                inner.encode_bool(false)
            });
            Ok(())
        })).unwrap();
        assert_eq!(bytes, [0x91, 0xc3]);
    }
}
