//! Encoding [`serde::Serialize`] types through the [`Encoder`] engine.
//!
//! Structs and maps become MessagePack maps keyed by field names, sequences and tuples
//! become arrays. Enum variants are externally tagged: a unit variant is its name, every
//! other variant a single-entry map from the name to the content. Map keys must serialize
//! as text; integers, booleans and chars are accepted and converted to their text form.
use core::fmt;

use pack_write::PackWrite;
use serde::{ser, Serialize};

use crate::config::Config;
use crate::deferred::Deferred;
use crate::encoder::{Encode, Encoder, MapEncoder, SeqEncoder};
use crate::error::{Error, ErrorKind, Result};

/// Serialize `value` with a default [`Config`].
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
    where T: Serialize + ?Sized
{
    crate::encode(&Serde(value), &Config::default())
}

/// Serialize `value` into a new vector of bytes.
pub fn encode<T>(value: &T, config: &Config) -> Result<Vec<u8>>
    where T: Serialize + ?Sized
{
    crate::encode(&Serde(value), config)
}

/// Serialize `value` and write it to a [`PackWrite`] implementation with a single write.
pub fn to_writer<W, T>(writer: W, value: &T, config: &Config) -> Result<()>
    where W: PackWrite, T: Serialize + ?Sized
{
    crate::to_writer(writer, &Serde(value), config)
}

/// Adapts a [`Serialize`] value to [`Encode`], so it can be nested in hand-written encodings.
#[derive(Debug, Clone, Copy)]
pub struct Serde<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Encode for Serde<'_, T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        serialize_into(self.0, encoder)
    }
}

/// Errors raised by `Serialize` impls carry no path; give them the path of `encoder`.
fn serialize_into<T>(value: &T, encoder: &mut Encoder<'_>) -> Result<()>
    where T: Serialize + ?Sized
{
    value.serialize(Serializer::new(&mut *encoder))
        .map_err(|err| err.or_at(encoder.path()))
}

/// A [`serde::Serializer`] declaring its value on an encoding context.
pub struct Serializer<'a, 'c> {
    encoder: &'a mut Encoder<'c>,
}

impl<'a, 'c> Serializer<'a, 'c> {
    pub fn new(encoder: &'a mut Encoder<'c>) -> Self {
        Serializer { encoder }
    }
}

impl<'a, 'c> ser::Serializer for Serializer<'a, 'c> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, 'c>;
    type SerializeTuple = SeqSerializer<'a, 'c>;
    type SerializeTupleStruct = SeqSerializer<'a, 'c>;
    type SerializeTupleVariant = VariantSerializer<'a, 'c>;
    type SerializeMap = MapSerializer<'a, 'c>;
    type SerializeStruct = MapSerializer<'a, 'c>;
    type SerializeStructVariant = VariantSerializer<'a, 'c>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.encoder.encode_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.encoder.encode_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.encoder.encode_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.encoder.encode_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.encoder.encode_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.encoder.encode_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.encoder.encode_u64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.encoder.encode_u64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.encoder.encode_u64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.encoder.encode_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.encoder.encode_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.encoder.encode_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.encoder.encode_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut encoding_tmp = [0u8; 4];
        self.encoder.encode_str(v.encode_utf8(&mut encoding_tmp))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.encoder.encode_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.encoder.encode_bytes(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.encoder.encode_nil()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.encoder.encode_str(variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()>
        where T: ?Sized + Serialize
    {
        value.serialize(self)
    }

    // { NAME: VALUE }
    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.encoder.open_map()?.put_with(variant, |encoder| serialize_into(value, encoder))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        let encoder = self.encoder;
        Ok(SeqSerializer { seq: encoder.open_seq()? })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    // { NAME: [ ... ] }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let encoder = self.encoder;
        let mut map = encoder.open_map()?;
        let mut content = map.defer(variant)?;
        content.encoder().open_seq()?;
        Ok(VariantSerializer { map, content })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let encoder = self.encoder;
        Ok(MapSerializer { map: encoder.open_map()?, key: None })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    // { NAME: { K: V, ... } }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let encoder = self.encoder;
        let mut map = encoder.open_map()?;
        let mut content = map.defer(variant)?;
        content.encoder().open_map()?;
        Ok(VariantSerializer { map, content })
    }

    fn collect_str<T>(self, value: &T) -> Result<()>
        where T: ?Sized + fmt::Display
    {
        self.encoder.encode_str(&value.to_string())
    }
}

/// Sequences, tuples and tuple structs
pub struct SeqSerializer<'a, 'c> {
    seq: SeqEncoder<'a, 'c>,
}

impl SeqSerializer<'_, '_> {
    fn element<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.seq.append_with(|encoder| serialize_into(value, encoder))
    }
}

impl ser::SerializeSeq for SeqSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for SeqSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for SeqSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Maps and structs
pub struct MapSerializer<'a, 'c> {
    map: MapEncoder<'a, 'c>,
    key: Option<String>,
}

impl ser::SerializeMap for MapSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        let key = key.serialize(KeySerializer).map_err(|err| err.or_at(self.map.path()))?;
        self.key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        let key = self.key.take().ok_or_else(|| Error::new(
            ErrorKind::InvalidTraversal("map value serialized before its key"),
            self.map.path().clone()))?;
        self.map.put_with(&key, |encoder| serialize_into(value, encoder))
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeStruct for MapSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.map.put_with(key, |encoder| serialize_into(value, encoder))
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Tuple and struct variants: the variant content is encoded into a slot reserved under
/// the variant name and committed at the end.
pub struct VariantSerializer<'a, 'c> {
    map: MapEncoder<'a, 'c>,
    content: Deferred<'c>,
}

impl ser::SerializeTupleVariant for VariantSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.content.encoder().open_seq()?
            .append_with(|encoder| serialize_into(value, encoder))
    }

    fn end(mut self) -> Result<()> {
        self.map.commit(self.content)
    }
}

impl ser::SerializeStructVariant for VariantSerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
        where T: ?Sized + Serialize
    {
        self.content.encoder().open_map()?
            .put_with(key, |encoder| serialize_into(value, encoder))
    }

    fn end(mut self) -> Result<()> {
        self.map.commit(self.content)
    }
}

/// Turns a map key into its text form.
struct KeySerializer;

fn key_must_be_text() -> Error {
    Error::from(ErrorKind::KeyMustBeText)
}

macro_rules! serialize_key_to_string {
    ($($method:ident($ty:ty)),*) => {$(
        fn $method(self, v: $ty) -> Result<String> {
            Ok(v.to_string())
        }
    )*};
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    serialize_key_to_string!(
        serialize_bool(bool),
        serialize_i8(i8), serialize_i16(i16), serialize_i32(i32), serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8), serialize_u16(u16), serialize_u32(u32), serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str)
    );

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
        where T: ?Sized + Serialize
    {
        Err(key_must_be_text())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_text())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
        where T: ?Sized + Serialize
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
        where T: ?Sized + Serialize
    {
        Err(key_must_be_text())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_text())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_text())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_text())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_text())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_text())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct> {
        Err(key_must_be_text())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_text())
    }

    fn collect_str<T>(self, value: &T) -> Result<String>
        where T: ?Sized + fmt::Display
    {
        Ok(value.to_string())
    }
}
