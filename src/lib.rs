//! Byte sinks for the `pack-msgpack` encoder.
//!
//! Encoders write finished MessagePack bytes to implementations of [`PackWrite`].
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc",not(feature = "std")))]
extern crate alloc;

use core::fmt;

mod foreign;

pub type WriteResult<T> = Result<T, WriteError>;

/// An error returned by [`PackWrite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WriteError {
    /// Buffer is full
    BufferFull,
}

#[cfg(feature = "std")]
impl std::error::Error for WriteError {}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::BufferFull => f.write_str("buffer is full"),
        }
    }
}

/// Encoders write their output to the implementations of this trait.
pub trait PackWrite {
    /// Write all bytes from `buf` to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    fn write(&mut self, buf: &[u8]) -> WriteResult<()>;
    /// Write a single `byte` to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.write(core::slice::from_ref(&byte))
    }
    /// Write a string to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    #[inline]
    fn write_str(&mut self, s: &str) -> WriteResult<()> {
        self.write(s.as_bytes())
    }
}

impl<T: PackWrite + ?Sized> PackWrite for &'_ mut T {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        (**self).write(buf)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        (**self).write_byte(byte)
    }
}

/// A writer over a fixed, borrowed byte slice
#[derive(Debug, PartialEq)]
pub struct SliceWriter<'a> {
    pub buf: &'a mut [u8],
    pub len: usize
}

impl<'a> AsRef<[u8]> for SliceWriter<'a> {
    /// Returns a populated portion of the slice
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<'a> SliceWriter<'a> {
    /// Create new instance
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, len: 0 }
    }
    /// Return populated length
    pub fn len(&self) -> usize {
        self.len
    }
    /// Return `true` if nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Return total capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
    /// Return remaining capacity
    pub fn rem_capacity(&self) -> usize {
        self.buf.len() - self.len
    }
    /// Forget the populated portion, so the whole buffer can be written again
    pub fn clear(&mut self) {
        self.len = 0;
    }
    /// Split the underlying buffer and return the portion of the populated buffer
    /// with an underlying buffer's borrowed lifetime.
    ///
    /// Once a SliceWriter is dropped the slice stays borrowed as long as an original container lives.
    pub fn split(self) -> (&'a mut[u8], Self) {
        let (res, buf) = self.buf.split_at_mut(self.len);
        (res, Self { buf, len: 0 })
    }
    /// Destruct into an underlying buffer
    pub fn into_buf(self) -> &'a mut [u8] {
        self.buf
    }
}

impl PackWrite for SliceWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        let end = self.len + buf.len();
        match self.buf.get_mut(self.len..end) {
            Some(chunk) => {
                chunk.copy_from_slice(buf);
                self.len = end;
                Ok(())
            }
            None => Err(WriteError::BufferFull)
        }
    }
}
