//! [`Encode`] for standard library types.
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use indexmap::IndexMap;

use crate::container::EncodedValue;
use crate::encoder::{Encode, Encoder};
use crate::error::Result;
use crate::types::{Binary, Timestamp};

macro_rules! impl_encode_as {
    ($method:ident($as:ty): $($ty:ty),*) => {$(
        impl Encode for $ty {
            #[inline]
            fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                encoder.$method(*self as $as)
            }
        }
    )*};
}

impl_encode_as!(encode_u64(u64): u8, u16, u32, u64, usize);
impl_encode_as!(encode_i64(i64): i8, i16, i32, i64, isize);
impl_encode_as!(encode_u128(u128): u128);
impl_encode_as!(encode_i128(i128): i128);
impl_encode_as!(encode_f32(f32): f32);
impl_encode_as!(encode_f64(f64): f64);

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_bool(*self)
    }
}

impl Encode for () {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_nil()
    }
}

impl Encode for char {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut buf = [0u8; 4];
        encoder.encode_str(self.encode_utf8(&mut buf))
    }
}

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_str(self)
    }
}

impl Encode for Binary<'_> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_bytes(self.0)
    }
}

impl Encode for Timestamp {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_timestamp(*self)
    }
}

impl Encode for SystemTime {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_timestamp(Timestamp::from(*self))
    }
}

impl Encode for EncodedValue {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_raw(self.clone())
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.encode_nil()
        }
    }
}

macro_rules! impl_encode_deref {
    ($($ty:ty),*) => {$(
        impl<T: Encode + ?Sized> Encode for $ty {
            #[inline]
            fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                (**self).encode(encoder)
            }
        }
    )*};
}

impl_encode_deref!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

impl<T: Encode + ToOwned + ?Sized> Encode for Cow<'_, T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(encoder)
    }
}

fn encode_items<'a, T, I>(items: I, encoder: &mut Encoder<'_>) -> Result<()>
    where T: Encode + 'a, I: IntoIterator<Item = &'a T>
{
    let mut seq = encoder.open_seq()?;
    for item in items {
        seq.append(item)?;
    }
    Ok(())
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_items(self, encoder)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_items(self, encoder)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_items(self, encoder)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_items(self, encoder)
    }
}

macro_rules! impl_encode_tuple {
    ($($name:ident)+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                let ($($name,)+) = self;
                let mut seq = encoder.open_seq()?;
                $(seq.append($name)?;)+
                Ok(())
            }
        }
    };
}

impl_encode_tuple!(A);
impl_encode_tuple!(A B);
impl_encode_tuple!(A B C);
impl_encode_tuple!(A B C D);
impl_encode_tuple!(A B C D E);
impl_encode_tuple!(A B C D E F);
impl_encode_tuple!(A B C D E F G);
impl_encode_tuple!(A B C D E F G H);

fn encode_entries<'a, K, V, I>(entries: I, encoder: &mut Encoder<'_>) -> Result<()>
    where K: AsRef<str> + 'a + ?Sized, V: Encode + 'a, I: IntoIterator<Item = (&'a K, &'a V)>
{
    let mut map = encoder.open_map()?;
    for (key, value) in entries {
        map.put(key.as_ref(), value)?;
    }
    Ok(())
}

impl<K: AsRef<str>, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_entries(self, encoder)
    }
}

impl<K: AsRef<str>, V: Encode, S> Encode for IndexMap<K, V, S> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_entries(self, encoder)
    }
}

/// Entries are written sorted by key, so equal maps always encode to the same bytes.
impl<K: AsRef<str>, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_unstable_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
        encode_entries(entries, encoder)
    }
}
