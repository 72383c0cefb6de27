//! Turning a finished artifact into MessagePack bytes.
use pack_write::PackWrite;

use crate::codec::{self, CodecResult};
use crate::container::{Artifact, EncodedValue, MapBuilder, SeqBuilder};
use crate::magick::FIXMAP;

fn write_map<W: PackWrite>(map: &MapBuilder, output: &mut W) -> CodecResult<()> {
    codec::write_map_len(output, map.len())?;
    for (key, slot) in map.entries() {
        codec::write_str(output, key)?;
        slot.write_to(output)?;
    }
    Ok(())
}

fn write_seq<W: PackWrite>(seq: &SeqBuilder, output: &mut W) -> CodecResult<()> {
    codec::write_array_len(output, seq.len())?;
    for slot in seq.items() {
        slot.write_to(output)?;
    }
    Ok(())
}

/// Write a whole artifact: a container header followed by its entries in insertion order,
/// or a scalar's bytes as they are. A context that produced nothing is an empty map.
pub(crate) fn assemble<W: PackWrite>(artifact: Option<&Artifact>, output: &mut W) -> CodecResult<()> {
    match artifact {
        Some(Artifact::Map(map)) => write_map(map, output),
        Some(Artifact::Seq(seq)) => write_seq(seq, output),
        Some(Artifact::Scalar(value)) => value.write_to(output),
        None => Ok(output.write_byte(FIXMAP)?)
    }
}

/// Close a child context's artifact into a value for its parent's container.
pub(crate) fn pop(artifact: Option<Artifact>) -> CodecResult<EncodedValue> {
    match artifact {
        Some(Artifact::Scalar(value)) => Ok(value),
        None => Ok(EncodedValue::empty_map()),
        Some(artifact) => EncodedValue::build(|output| assemble(Some(&artifact), output))
    }
}
