//! Growable byte buffer with a sequential read cursor
//!
//! [`ByteBuffer`] is the single concrete buffer type of this crate. It is
//! written through [`Target`] (append-only) and read through [`Parser`]
//! (cursor-advance-only), and is owned exclusively by the encode or decode
//! session that uses it. It is not internally synchronized; share one
//! between threads only behind external locking.
//!
//! A buffer can also be carried *inside* a message: it implements
//! [`Message`] under [`TypeTag::BYTE_BUFFER`], with a body consisting of a
//! varint length followed by the raw bytes.

use std::fmt::Debug;
use std::sync::Arc;

#[cfg(feature = "serde_impls")]
use serde::Serialize;

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::object::registry::Registry;
use crate::object::{Message, TypeTag};
use crate::parse::error::{ParseError, ParseResult};
use crate::parse::{Parser, DEFAULT_DEPTH_LIMIT};
use crate::varint;

/// Byte sequence with a read offset, an optional read limit, a nesting
/// depth limit and an optional decoder registry
///
/// # Invariants
///
/// `0 <= offset <= len` at all times; every successful read of `N` bytes
/// advances the offset by exactly `N`.
#[derive(Clone)]
pub struct ByteBuffer {
    buf: Vec<u8>,
    offset: usize,
    read_limit: usize,
    depth: usize,
    depth_limit: usize,
    registry: Option<Arc<Registry>>,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            offset: 0,
            read_limit: 0,
            depth: 0,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            registry: None,
        }
    }
}

impl ByteBuffer {
    /// Constructs a new, empty `ByteBuffer` with no read limit and no registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs an empty `ByteBuffer` that can hold `capacity` bytes without reallocating
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Sets the read limit applied to length-prefixed strings and blobs
    ///
    /// A limit of `0` disables the check.
    #[must_use]
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit;
        self
    }

    /// Sets how many objects, lists and boxes may be nested inside one another
    /// while decoding
    ///
    /// Defaults to [`DEFAULT_DEPTH_LIMIT`]. A limit of `0` only admits
    /// values with no nesting at all.
    #[must_use]
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    /// Attaches the registry used to decode polymorphic object slots
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn set_read_limit(&mut self, limit: usize) {
        self.read_limit = limit;
    }

    pub fn set_depth_limit(&mut self, limit: usize) {
        self.depth_limit = limit;
    }

    pub fn set_registry(&mut self, registry: Option<Arc<Registry>>) {
        self.registry = registry;
    }

    /// Number of bytes held, read or not
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// All bytes held, regardless of the read offset
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// The bytes between the read offset and the end of the buffer
    #[inline]
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.offset..]
    }

    /// Destructs the buffer and returns the bytes it held
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Appends raw bytes to the end of the buffer
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Resets the length and read offset to zero, keeping the allocation
    ///
    /// The read limit, depth limit and registry are configuration, not
    /// content, and survive a clear. In particular the read limit is *not*
    /// zeroed here; follow with [`set_read_limit(0)`](ByteBuffer::set_read_limit)
    /// when a cleared buffer should also drop its limit.
    pub fn clear(&mut self) {
        log::trace!(
            "[ByteBuffer::clear] dropping {} bytes, keeping capacity {}",
            self.buf.len(),
            self.buf.capacity()
        );
        self.buf.clear();
        self.offset = 0;
        self.depth = 0;
    }

    /// Moves the read offset back to the start of the buffer
    pub fn rewind(&mut self) {
        self.offset = 0;
        self.depth = 0;
    }
}

impl Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("buf", &self.buf)
            .field("offset", &self.offset)
            .field("read_limit", &self.read_limit)
            .field("depth_limit", &self.depth_limit)
            .field("registry", &self.registry.as_ref().map(|reg| reg.len()))
            .finish()
    }
}

/// Two buffers are equal when they hold the same bytes; cursor and
/// configuration are not part of the value.
impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for ByteBuffer {}

#[cfg(feature = "serde_impls")]
impl Serialize for ByteBuffer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
        serializer.serialize_bytes(&self.buf)
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(buf: Vec<u8>) -> Self {
        Self {
            buf,
            ..Self::default()
        }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(buf: &[u8]) -> Self {
        Self::from(buf.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for ByteBuffer {
    fn from(buf: [u8; N]) -> Self {
        Self::from(buf.to_vec())
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(val: ByteBuffer) -> Self {
        val.buf
    }
}

impl Target for ByteBuffer {
    /// Calls `<Vec<u8> as Target>::anticipate` on the inner vector
    fn anticipate(&mut self, extra: usize) {
        self.buf.anticipate(extra)
    }

    /// Calls `<Vec<u8> as Target>::push_one` on the inner vector.
    fn push_one(&mut self, b: u8) -> usize {
        self.buf.push_one(b)
    }

    /// Calls `<Vec<u8> as Target>::push_all` on the inner vector.
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.buf.push_all(buf)
    }
}

impl Parser for ByteBuffer {
    fn view_len(&self) -> usize {
        self.buf.len()
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        match self.buf.get(self.offset) {
            Some(&byte) => {
                self.offset += 1;
                Ok(byte)
            }
            None => Err(ParseError::underrun(self.offset, 1, 0)),
        }
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        let available = self.remainder();
        if nbytes > available {
            return Err(ParseError::underrun(self.offset, nbytes, available));
        }
        let start = self.offset;
        self.offset += nbytes;
        Ok(&self.buf[start..self.offset])
    }

    fn read_limit(&self) -> usize {
        self.read_limit
    }

    fn registry(&self) -> Option<Arc<Registry>> {
        self.registry.clone()
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    fn depth_limit(&self) -> usize {
        self.depth_limit
    }
}

impl Encode for ByteBuffer {
    /// Writes the whole content (not just the unread part) as a length-prefixed blob
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        varint::write_varint(self.buf.len() as u64, buf) + buf.push_all(&self.buf) + crate::resolve_zero!(buf)
    }
}

impl Decode for ByteBuffer {
    /// Reads a length-prefixed blob, subject to the read limit of `p`
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        Ok(Self::from(p.take_blob()?))
    }
}

impl Message for ByteBuffer {
    const TYPE_TAG: TypeTag = TypeTag::BYTE_BUFFER;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::LengthError;

    #[test]
    fn append_then_read() {
        let mut bb = ByteBuffer::new();
        bb.append(&[1, 2]);
        bb.push_one(3);
        assert_eq!(bb.len(), 3);
        assert_eq!(bb.take_u8(), Ok(1));
        assert_eq!(bb.unread(), &[2, 3]);
        assert_eq!(bb.remainder(), 2);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut bb = ByteBuffer::with_capacity(64).with_read_limit(16);
        bb.append(&[0u8; 32]);
        let _ = bb.consume(8);
        let cap = bb.buf.capacity();
        bb.clear();
        assert!(bb.is_empty());
        assert_eq!(bb.offset(), 0);
        assert_eq!(bb.buf.capacity(), cap);
        assert_eq!(bb.read_limit(), 16);
        assert_eq!(bb.depth_limit(), DEFAULT_DEPTH_LIMIT);
    }

    #[test]
    fn clear_closes_open_nesting() {
        let mut bb = ByteBuffer::from(vec![1, 2]).with_depth_limit(1);
        assert_eq!(bb.enter_nested(), Ok(()));
        bb.clear();
        assert_eq!(bb.depth(), 0);
        assert_eq!(bb.depth_limit(), 1);
        assert_eq!(bb.enter_nested(), Ok(()));
    }

    #[test]
    fn underrun_reports_position() {
        let mut bb = ByteBuffer::from([9u8, 9]);
        let _ = bb.consume_byte();
        assert_eq!(
            bb.consume(2).map(<[u8]>::to_vec),
            Err(ParseError::BufferUnderrun {
                offset: 1,
                requested: 2,
                available: 1
            })
        );
    }

    #[test]
    fn nested_buffer_body() {
        let inner = ByteBuffer::from(vec![0xde, 0xad]);
        assert_eq!(inner.to_bytes(), vec![0x02, 0xde, 0xad]);

        let mut outer = ByteBuffer::from(inner.to_bytes());
        assert_eq!(ByteBuffer::parse(&mut outer), Ok(inner));
    }

    #[test]
    fn nested_buffer_honours_read_limit() {
        let bytes = ByteBuffer::from(vec![0u8; 5]).to_bytes();
        let mut outer = ByteBuffer::from(bytes).with_read_limit(4);
        assert_eq!(
            ByteBuffer::parse(&mut outer),
            Err(ParseError::LengthLimitExceeded(LengthError::TooLong {
                limit: 4,
                actual: 5
            }))
        );
    }

    #[test]
    fn equality_ignores_cursor() {
        let mut a = ByteBuffer::from(vec![1, 2, 3]);
        let b = ByteBuffer::from(vec![1, 2, 3]).with_read_limit(2);
        let _ = a.consume(2);
        assert_eq!(a, b);
    }
}
