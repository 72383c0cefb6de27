//! [`PackWrite`] for collections and buffers from other crates.
//!
//! Every write either stores all of its bytes or fails leaving the sink as it was, so a
//! message written with a single call is never left half written.
#[cfg(feature = "std")]
use std::{vec::Vec, collections::VecDeque, io::Cursor};
#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::{vec::Vec, collections::VecDeque};

#[allow(unused_imports)]
use super::*;

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl PackWrite for Vec<u8> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte);
        Ok(())
    }
}

/// Bytes are appended at the back, so the deque can be drained from the front as a queue
/// of outgoing messages.
#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl PackWrite for VecDeque<u8> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.reserve(buf.len());
        self.extend(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push_back(byte);
        Ok(())
    }
}

/// A write that doesn't fit rewinds the cursor to where the write started.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> PackWrite for Cursor<T>
    where Cursor<T>: std::io::Write
{
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        let start = self.position();
        std::io::Write::write_all(self, buf).map_err(|_| {
            self.set_position(start);
            WriteError::BufferFull
        })
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> PackWrite for arrayvec::ArrayVec<u8, CAP> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.try_extend_from_slice(buf).map_err(|_| WriteError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.try_push(byte).map_err(|_| WriteError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> PackWrite for heapless::Vec<u8, CAP> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf).map_err(|_| WriteError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte).map_err(|_| WriteError::BufferFull)
    }
}
