//! A MessagePack encoder driven by self-describing values, writing to [`pack-write`](`pack_write`) sinks.
/*!

Values implement [`Encode`] and declare their own shape on an [`Encoder`]: a map of
named fields, an ordered sequence, or a single scalar. Nested values are encoded in
their own child contexts, and a value may hand part of its encoding to a deferred
sub-encoder (for example a base type contributing its fields under `"super"`).

Any [`serde::Serialize`] type can be encoded through the same engine with [`ser::to_vec`].

[`Encode`] types:

| Rust type ->            | MessagePack type
|-------------------------|--------------------
| `()`, `None`            | `nil`
| `bool`                  | `bool`
| `u8`-`u128`             | `uint` (smallest representation)
| `i8`-`i128`             | `int`, `uint` (smallest representation)
| `f32`                   | `float-32`
| `f64`                   | `float-64`
| `str`, `String`, `char` | `str`
| [`Binary`]              | `bin`
| [`Timestamp`], `SystemTime` | `fixext:4` type `-1` (seconds)
| slices, `Vec`, tuples   | `array` (sm. repr.)
| `BTreeMap`, `IndexMap`, `HashMap` | `map` (sm. repr., text keys)

Maps keep their entries in insertion order, so encoding the same value twice always
produces identical bytes. A context that declares nothing encodes as an empty map.

```
use pack_msgpack::{encode, Config, Encode, Encoder, Result};

struct Point { x: i32, y: i32 }

impl Encode for Point {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut map = encoder.open_map()?;
        map.put("x", &self.x)?;
        map.put("y", &self.y)
    }
}

let bytes = encode(&Point { x: 1, y: -1 }, &Config::default()).unwrap();
assert_eq!(bytes, [0x82, 0xa1, b'x', 0x01, 0xa1, b'y', 0xff]);
```
*/
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod config;
pub mod container;
pub mod deferred;
pub mod encoder;
pub mod error;
pub mod ser;
pub mod types;

mod assemble;
mod impls;

pub use pack_write;
pub use pack_write::PackWrite;

pub use config::{Config, UserInfo};
pub use container::EncodedValue;
pub use deferred::{Deferred, SlotRef};
pub use encoder::{encode, to_vec, to_writer, Encode, Encoder, MapEncoder, SeqEncoder};
pub use error::{Error, ErrorKind, Path, PathSegment, Result, Unrepresentable};
pub use types::{Binary, Timestamp};

mod magick {
    /* MessagePack MAGICK */
    pub const MAX_POSFIXINT: u8 = 0x7f;
    pub const MIN_NEGFIXINT: i64 = -32;
    pub const NIL: u8      = 0xc0;
    pub const FALSE: u8    = 0xc2;
    pub const TRUE: u8     = 0xc3;

    pub const FIXMAP: u8   = 0x80; /* 1000xxxx */
    pub const MAX_FIXMAP_SIZE: usize = 0b1111;

    pub const FIXARRAY: u8 = 0x90; /* 1001xxxx */
    pub const MAX_FIXARRAY_SIZE: usize = 0b1111;

    pub const FIXSTR: u8   = 0xa0; /* 101xxxxx */
    pub const MAX_FIXSTR_SIZE: usize = 0b11111;

    pub const BIN_8: u8     = 0xc4;
    pub const BIN_16: u8    = 0xc5;
    pub const BIN_32: u8    = 0xc6;

    pub const FLOAT_32: u8  = 0xca;
    pub const FLOAT_64: u8  = 0xcb;

    pub const UINT_8: u8    = 0xcc;
    pub const UINT_16: u8   = 0xcd;
    pub const UINT_32: u8   = 0xce;
    pub const UINT_64: u8   = 0xcf;

    pub const INT_8: u8     = 0xd0;
    pub const INT_16: u8    = 0xd1;
    pub const INT_32: u8    = 0xd2;
    pub const INT_64: u8    = 0xd3;

    pub const FIXEXT_4: u8  = 0xd6;
    pub const TIMESTAMP_EXT: u8 = 0xff; /* -1 */

    pub const STR_8: u8     = 0xd9;
    pub const STR_16: u8    = 0xda;
    pub const STR_32: u8    = 0xdb;

    pub const ARRAY_16: u8  = 0xdc;
    pub const ARRAY_32: u8  = 0xdd;

    pub const MAP_16: u8    = 0xde;
    pub const MAP_32: u8    = 0xdf;
}
