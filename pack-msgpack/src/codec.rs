//! MessagePack format codec.
//!
//! Stateless writers of a single MessagePack item (or container header) to a [`PackWrite`].
//! Integers are always written in their narrowest representation, regardless of the source width.
use pack_write::PackWrite;

use crate::error::{ErrorKind, Unrepresentable};
use crate::magick::*;

/// Codec result, located by the calling [`Encoder`](crate::Encoder)
pub type CodecResult<T> = Result<T, ErrorKind>;

#[inline]
pub fn write_nil<W: PackWrite>(output: &mut W) -> CodecResult<()> {
    Ok(output.write_byte(NIL)?)
}

#[inline]
pub fn write_bool<W: PackWrite>(output: &mut W, v: bool) -> CodecResult<()> {
    Ok(output.write_byte(if v { TRUE } else { FALSE })?)
}

/// Write an unsigned integer as a positive fixint, `uint 8`, `uint 16`, `uint 32` or `uint 64`.
pub fn write_uint<W: PackWrite>(output: &mut W, v: u64) -> CodecResult<()> {
    if v <= MAX_POSFIXINT as u64 {
        output.write_byte(v as u8)?;
    }
    else if let Ok(v) = u8::try_from(v) {
        output.write_byte(UINT_8)?;
        output.write_byte(v)?;
    }
    else if let Ok(v) = u16::try_from(v) {
        output.write_byte(UINT_16)?;
        output.write(&v.to_be_bytes())?;
    }
    else if let Ok(v) = u32::try_from(v) {
        output.write_byte(UINT_32)?;
        output.write(&v.to_be_bytes())?;
    }
    else {
        output.write_byte(UINT_64)?;
        output.write(&v.to_be_bytes())?;
    }
    Ok(())
}

/// Write a signed integer.
///
/// Non-negative values are written with [`write_uint`], negative ones as a negative fixint,
/// `int 8`, `int 16`, `int 32` or `int 64`.
pub fn write_int<W: PackWrite>(output: &mut W, v: i64) -> CodecResult<()> {
    if let Ok(v) = u64::try_from(v) {
        return write_uint(output, v)
    }
    if v >= MIN_NEGFIXINT {
        output.write_byte(v as u8)?;
    }
    else if let Ok(v) = i8::try_from(v) {
        output.write_byte(INT_8)?;
        output.write_byte(v as u8)?;
    }
    else if let Ok(v) = i16::try_from(v) {
        output.write_byte(INT_16)?;
        output.write(&v.to_be_bytes())?;
    }
    else if let Ok(v) = i32::try_from(v) {
        output.write_byte(INT_32)?;
        output.write(&v.to_be_bytes())?;
    }
    else {
        output.write_byte(INT_64)?;
        output.write(&v.to_be_bytes())?;
    }
    Ok(())
}

pub fn write_i128<W: PackWrite>(output: &mut W, v: i128) -> CodecResult<()> {
    if let Ok(v) = u64::try_from(v) {
        write_uint(output, v)
    }
    else if let Ok(v) = i64::try_from(v) {
        write_int(output, v)
    }
    else {
        Err(Unrepresentable::Integer.into())
    }
}

pub fn write_u128<W: PackWrite>(output: &mut W, v: u128) -> CodecResult<()> {
    let v = u64::try_from(v).map_err(|_| Unrepresentable::Integer)?;
    write_uint(output, v)
}

#[inline]
pub fn write_f32<W: PackWrite>(output: &mut W, v: f32) -> CodecResult<()> {
    output.write_byte(FLOAT_32)?;
    Ok(output.write(&v.to_be_bytes())?)
}

#[inline]
pub fn write_f64<W: PackWrite>(output: &mut W, v: f64) -> CodecResult<()> {
    output.write_byte(FLOAT_64)?;
    Ok(output.write(&v.to_be_bytes())?)
}

pub fn write_str_len<W: PackWrite>(output: &mut W, len: usize) -> CodecResult<()> {
    if len <= MAX_FIXSTR_SIZE {
        output.write_byte(FIXSTR | (len as u8))?;
    }
    else if let Ok(len) = u8::try_from(len) {
        output.write_byte(STR_8)?;
        output.write_byte(len)?;
    }
    else if let Ok(len) = u16::try_from(len) {
        output.write_byte(STR_16)?;
        output.write(&len.to_be_bytes())?;
    }
    else if let Ok(len) = u32::try_from(len) {
        output.write_byte(STR_32)?;
        output.write(&len.to_be_bytes())?;
    }
    else {
        return Err(Unrepresentable::Str(len).into())
    }
    Ok(())
}

pub fn write_str<W: PackWrite>(output: &mut W, v: &str) -> CodecResult<()> {
    write_str_len(output, v.len())?;
    Ok(output.write_str(v)?)
}

pub fn write_bin_len<W: PackWrite>(output: &mut W, len: usize) -> CodecResult<()> {
    if let Ok(len) = u8::try_from(len) {
        output.write_byte(BIN_8)?;
        output.write_byte(len)?;
    }
    else if let Ok(len) = u16::try_from(len) {
        output.write_byte(BIN_16)?;
        output.write(&len.to_be_bytes())?;
    }
    else if let Ok(len) = u32::try_from(len) {
        output.write_byte(BIN_32)?;
        output.write(&len.to_be_bytes())?;
    }
    else {
        return Err(Unrepresentable::Bin(len).into())
    }
    Ok(())
}

pub fn write_bin<W: PackWrite>(output: &mut W, v: &[u8]) -> CodecResult<()> {
    write_bin_len(output, v.len())?;
    Ok(output.write(v)?)
}

/// Write a 32-bit timestamp extension: `fixext 4`, type `-1` and the seconds since the Unix epoch.
pub fn write_timestamp<W: PackWrite>(output: &mut W, unix_secs: i64) -> CodecResult<()> {
    let secs = u32::try_from(unix_secs).map_err(|_| Unrepresentable::Timestamp(unix_secs))?;
    output.write(&[FIXEXT_4, TIMESTAMP_EXT])?;
    Ok(output.write(&secs.to_be_bytes())?)
}

pub fn write_array_len<W: PackWrite>(output: &mut W, len: usize) -> CodecResult<()> {
    if len <= MAX_FIXARRAY_SIZE {
        output.write_byte(FIXARRAY | (len as u8))?;
    }
    else if let Ok(len) = u16::try_from(len) {
        output.write_byte(ARRAY_16)?;
        output.write(&len.to_be_bytes())?;
    }
    else if let Ok(len) = u32::try_from(len) {
        output.write_byte(ARRAY_32)?;
        output.write(&len.to_be_bytes())?;
    }
    else {
        return Err(Unrepresentable::Array(len).into())
    }
    Ok(())
}

pub fn write_map_len<W: PackWrite>(output: &mut W, len: usize) -> CodecResult<()> {
    if len <= MAX_FIXMAP_SIZE {
        output.write_byte(FIXMAP | (len as u8))?;
    }
    else if let Ok(len) = u16::try_from(len) {
        output.write_byte(MAP_16)?;
        output.write(&len.to_be_bytes())?;
    }
    else if let Ok(len) = u32::try_from(len) {
        output.write_byte(MAP_32)?;
        output.write(&len.to_be_bytes())?;
    }
    else {
        return Err(Unrepresentable::Map(len).into())
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pack_write::{SliceWriter, WriteError};

    fn bytes<F>(f: F) -> Vec<u8>
        where F: FnOnce(&mut Vec<u8>) -> CodecResult<()>
    {
        let mut vec = Vec::new();
        f(&mut vec).unwrap();
        vec
    }

    #[test]
    fn test_nil_bool() {
        assert_eq!(bytes(|w| write_nil(w)), [0xc0]);
        assert_eq!(bytes(|w| write_bool(w, false)), [0xc2]);
        assert_eq!(bytes(|w| write_bool(w, true)), [0xc3]);
    }

    #[test]
    fn test_uint() {
        assert_eq!(bytes(|w| write_uint(w, 0)), [0x00]);
        assert_eq!(bytes(|w| write_uint(w, 42)), [0x2a]);
        assert_eq!(bytes(|w| write_uint(w, 127)), [0x7f]);
        assert_eq!(bytes(|w| write_uint(w, 128)), [0xcc, 0x80]);
        assert_eq!(bytes(|w| write_uint(w, 255)), [0xcc, 0xff]);
        assert_eq!(bytes(|w| write_uint(w, 256)), [0xcd, 0x01, 0x00]);
        assert_eq!(bytes(|w| write_uint(w, 1000)), [0xcd, 0x03, 0xe8]);
        assert_eq!(bytes(|w| write_uint(w, 65535)), [0xcd, 0xff, 0xff]);
        assert_eq!(bytes(|w| write_uint(w, 65536)), [0xce, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(bytes(|w| write_uint(w, u32::MAX as u64)), [0xce, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(bytes(|w| write_uint(w, 1 << 32)), [0xcf, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(bytes(|w| write_uint(w, u64::MAX)), [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_int() {
        assert_eq!(bytes(|w| write_int(w, 100)), [0x64]);
        assert_eq!(bytes(|w| write_int(w, 1000)), [0xcd, 0x03, 0xe8]);
        assert_eq!(bytes(|w| write_int(w, 200)), [0xcc, 0xc8]);
        assert_eq!(bytes(|w| write_int(w, -1)), [0xff]);
        assert_eq!(bytes(|w| write_int(w, -32)), [0xe0]);
        assert_eq!(bytes(|w| write_int(w, -33)), [0xd0, 0xdf]);
        assert_eq!(bytes(|w| write_int(w, -128)), [0xd0, 0x80]);
        assert_eq!(bytes(|w| write_int(w, -129)), [0xd1, 0xff, 0x7f]);
        assert_eq!(bytes(|w| write_int(w, i16::MIN as i64)), [0xd1, 0x80, 0x00]);
        assert_eq!(bytes(|w| write_int(w, i16::MIN as i64 - 1)), [0xd2, 0xff, 0xff, 0x7f, 0xff]);
        assert_eq!(bytes(|w| write_int(w, i32::MIN as i64)), [0xd2, 0x80, 0x00, 0x00, 0x00]);
        assert_eq!(bytes(|w| write_int(w, i32::MIN as i64 - 1)),
                   [0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff]);
        assert_eq!(bytes(|w| write_int(w, i64::MIN)), [0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes(|w| write_int(w, i64::MAX)), [0xcf, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_wide_int() {
        assert_eq!(bytes(|w| write_i128(w, -1)), [0xff]);
        assert_eq!(bytes(|w| write_i128(w, u64::MAX as i128)), [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(bytes(|w| write_u128(w, 1000)), [0xcd, 0x03, 0xe8]);
        let mut vec = Vec::new();
        assert_eq!(write_i128(&mut vec, i128::MIN), Err(ErrorKind::UnrepresentableValue(Unrepresentable::Integer)));
        assert_eq!(write_i128(&mut vec, u64::MAX as i128 + 1), Err(ErrorKind::from(Unrepresentable::Integer)));
        assert_eq!(write_u128(&mut vec, u128::MAX), Err(ErrorKind::from(Unrepresentable::Integer)));
        assert!(vec.is_empty());
    }

    #[test]
    fn test_float() {
        assert_eq!(bytes(|w| write_f32(w, 1.5)), [0xca, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(bytes(|w| write_f64(w, 1.5)), [0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes(|w| write_f64(w, -0.0)), [0xcb, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_str_tiers() {
        assert_eq!(bytes(|w| write_str(w, "")), [0xa0]);
        assert_eq!(bytes(|w| write_str(w, "a")), [0xa1, 0x61]);
        let s = "x".repeat(31);
        assert_eq!(bytes(|w| write_str(w, &s))[0], 0xbf);
        let s = "x".repeat(32);
        assert_eq!(&bytes(|w| write_str(w, &s))[..2], [0xd9, 32]);
        let s = "x".repeat(255);
        assert_eq!(&bytes(|w| write_str(w, &s))[..2], [0xd9, 255]);
        let s = "x".repeat(256);
        let out = bytes(|w| write_str(w, &s));
        assert_eq!(&out[..3], [0xda, 0x01, 0x00]);
        assert_eq!(out.len(), 3 + 256);
        let s = "x".repeat(65536);
        assert_eq!(&bytes(|w| write_str(w, &s))[..5], [0xdb, 0x00, 0x01, 0x00, 0x00]);
        // multi-byte characters count in bytes
        assert_eq!(bytes(|w| write_str(w, "ł")), [0xa2, 0xc5, 0x82]);
    }

    #[test]
    fn test_oversize_lengths() {
        let mut vec = Vec::new();
        let too_long = u32::MAX as usize + 1;
        assert_eq!(write_str_len(&mut vec, too_long), Err(ErrorKind::from(Unrepresentable::Str(too_long))));
        assert_eq!(write_bin_len(&mut vec, too_long), Err(ErrorKind::from(Unrepresentable::Bin(too_long))));
        assert_eq!(write_array_len(&mut vec, too_long), Err(ErrorKind::from(Unrepresentable::Array(too_long))));
        assert_eq!(write_map_len(&mut vec, too_long), Err(ErrorKind::from(Unrepresentable::Map(too_long))));
        assert!(vec.is_empty());
        write_str_len(&mut vec, u32::MAX as usize).unwrap();
        assert_eq!(vec, [0xdb, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_bin_tiers() {
        assert_eq!(bytes(|w| write_bin(w, &[])), [0xc4, 0x00]);
        assert_eq!(bytes(|w| write_bin(w, &[1, 2, 3])), [0xc4, 0x03, 1, 2, 3]);
        let blob = [7u8; 255];
        assert_eq!(&bytes(|w| write_bin(w, &blob))[..2], [0xc4, 0xff]);
        let blob = [7u8; 256];
        let out = bytes(|w| write_bin(w, &blob));
        assert_eq!(&out[..3], [0xc5, 0x01, 0x00]);
        assert_eq!(&out[3..], &blob[..]);
        let blob = vec![7u8; 65536];
        assert_eq!(&bytes(|w| write_bin(w, &blob))[..5], [0xc6, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(bytes(|w| write_timestamp(w, 0)), [0xd6, 0xff, 0, 0, 0, 0]);
        assert_eq!(bytes(|w| write_timestamp(w, 1_700_000_000)), [0xd6, 0xff, 0x65, 0x53, 0xf1, 0x00]);
        assert_eq!(bytes(|w| write_timestamp(w, u32::MAX as i64)), [0xd6, 0xff, 0xff, 0xff, 0xff, 0xff]);
        let mut vec = Vec::new();
        assert_eq!(write_timestamp(&mut vec, -1), Err(ErrorKind::from(Unrepresentable::Timestamp(-1))));
        assert_eq!(write_timestamp(&mut vec, 1 << 32), Err(ErrorKind::from(Unrepresentable::Timestamp(1 << 32))));
        assert!(vec.is_empty());
    }

    #[test]
    fn test_container_headers() {
        assert_eq!(bytes(|w| write_array_len(w, 0)), [0x90]);
        assert_eq!(bytes(|w| write_array_len(w, 15)), [0x9f]);
        assert_eq!(bytes(|w| write_array_len(w, 16)), [0xdc, 0x00, 0x10]);
        assert_eq!(bytes(|w| write_array_len(w, 65535)), [0xdc, 0xff, 0xff]);
        assert_eq!(bytes(|w| write_array_len(w, 65536)), [0xdd, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(bytes(|w| write_map_len(w, 0)), [0x80]);
        assert_eq!(bytes(|w| write_map_len(w, 15)), [0x8f]);
        assert_eq!(bytes(|w| write_map_len(w, 16)), [0xde, 0x00, 0x10]);
        assert_eq!(bytes(|w| write_map_len(w, 65536)), [0xdf, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_writer_full() {
        let mut buf = [0u8; 2];
        let mut writer = SliceWriter::new(&mut buf);
        assert_eq!(write_uint(&mut writer, 1000), Err(ErrorKind::Writer(WriteError::BufferFull)));
        let mut buf = [0u8; 1];
        let mut writer = SliceWriter::new(&mut buf);
        write_int(&mut writer, -5).unwrap();
        assert_eq!(writer.as_ref(), &[0xfb]);
    }
}
