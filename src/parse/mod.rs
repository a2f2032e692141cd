//! Sequential read-cursor model with byte-level precision
//!
//! This module, along with its `error` submodule, provides the fundamental
//! definitions related to the abstract task of processing raw sequences
//! of binary data into the low-level fragments at the leaf nodes of
//! an arbitrarily complex message type.
//!
//! For type-aware parsing, in other words, parsing message types
//! directly rather than as an unstructured sequence of primitives,
//! see the [`Decode`](crate::conv::Decode) trait, which is a
//! high-level interface built almost entirely around the definitions
//! contained within this module.
//!
//! # Model
//!
//! * A `Parser` is a cursor over an immutable byte sequence.
//! * All parsing is non-backtracking and zero-lookahead; a byte in the buffer
//!   can only be viewed by consuming it, and only after all preceding bytes
//!   have been consumed.
//! * A read of `n` bytes either advances the cursor by exactly `n`, or fails
//!   with [`ParseError::BufferUnderrun`] without advancing it.
//! * Length-prefixed strings and blobs are checked against an optional
//!   read limit ([`Parser::read_limit`]) before any bytes are taken.
//! * A parser may carry a [`Registry`] used to resolve polymorphic object
//!   slots.
//! * Every object, list and box being decoded counts as one level of
//!   nesting. Going past [`Parser::depth_limit`] levels fails with
//!   [`ParseError::DepthLimitExceeded`], so self-referencing message types
//!   cannot exhaust the stack.
//!
//! The trait is object-safe: registry decoders receive a `&mut dyn Parser`.

pub mod error;

use std::sync::Arc;

pub use error::ParseResult;
use error::{coerce_slice, ParseError};

use crate::error::LengthError;
use crate::object::registry::Registry;
use crate::varint;

/// Nesting depth permitted by a parser that does not configure its own
pub const DEFAULT_DEPTH_LIMIT: usize = 128;

/// # Parser
///
/// Abstraction over a stateful read cursor, with provided `take_*` readers
/// for every primitive wire form of the codec.
///
/// The following properties should be respected by each implementation:
///
/// * A fresh `p : impl Parser` should have `p.offset() == 0`
/// * `p.remainder()` is the largest `n` for which `p.consume(n)` succeeds
/// * A successful `p.consume(n)` decreases `p.remainder()` by exactly `n`;
///   a failed one leaves it unchanged
pub trait Parser {
    /// Length of the underlying byte sequence
    fn view_len(&self) -> usize;

    /// Current value of the read cursor
    fn offset(&self) -> usize;

    /// Number of bytes that can still be consumed
    ///
    /// Even if it can be implemented directly, this should always return the
    /// same value as computing `self.view_len() - self.offset()`
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Consumes and returns a single byte from the current offset position
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Attempt to consume and return a slice of length `nbytes`,
    /// starting from the first unconsumed byte in the buffer.
    ///
    /// # Invariants
    ///
    /// This method **MUST** return `Ok(s)` when and only when `nbytes` does
    /// not exceed [`remainder`](Parser::remainder), and in such cases,
    /// `s.len()` must be equal to `nbytes`.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    /// Maximum declared length accepted for strings and blobs; `0` disables the check
    fn read_limit(&self) -> usize {
        0
    }

    /// Registry used to decode polymorphic object slots, if any
    fn registry(&self) -> Option<Arc<Registry>> {
        None
    }

    /// Number of nesting levels currently open
    fn depth(&self) -> usize;

    /// Overwrites the nesting level counter
    ///
    /// Only [`enter_nested`](Parser::enter_nested) and
    /// [`leave_nested`](Parser::leave_nested) should call this.
    fn set_depth(&mut self, depth: usize);

    /// Maximum number of nesting levels that may be open at once
    fn depth_limit(&self) -> usize {
        DEFAULT_DEPTH_LIMIT
    }

    /// Opens one level of nesting, failing if that would exceed
    /// [`depth_limit`](Parser::depth_limit)
    ///
    /// Every successful call must be paired with a call to
    /// [`leave_nested`](Parser::leave_nested), whether or not the nested
    /// decode succeeded.
    fn enter_nested(&mut self) -> ParseResult<()> {
        let depth = self.depth() + 1;
        let limit = self.depth_limit();
        if depth > limit {
            log::warn!(
                "[Parser::enter_nested] depth limit {limit} exceeded at offset {}",
                self.offset()
            );
            return Err(ParseError::DepthLimitExceeded {
                offset: self.offset(),
                limit,
            });
        }
        self.set_depth(depth);
        Ok(())
    }

    /// Closes the innermost level of nesting
    fn leave_nested(&mut self) {
        let depth = self.depth().saturating_sub(1);
        self.set_depth(depth);
    }

    /// Consumes `N` bytes and returns them in array-form
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]>
    where
        Self: Sized,
    {
        coerce_slice(self.consume(N)?)
    }

    /// Consumes one byte and returns it as a `u8` value
    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    /// Consumes one byte and returns it as an `i8` value
    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    /// Consumes a single byte and returns the boolean value it represents
    ///
    /// `0x00` is `false`; every other byte is `true`.
    #[inline]
    fn take_bool(&mut self) -> ParseResult<bool> {
        Ok(self.consume_byte()? != 0)
    }

    /// Consumes a presence marker, returning `true` if a value follows
    ///
    /// Uses the same byte interpretation as [`take_bool`](Parser::take_bool).
    #[inline]
    fn take_presence(&mut self) -> ParseResult<bool> {
        self.take_bool()
    }

    /// Consumes an unsigned varint
    fn take_varint(&mut self) -> ParseResult<u64> {
        varint::read_varint(self)
    }

    /// Consumes a zigzag-mapped signed varint
    fn take_zigzag(&mut self) -> ParseResult<i64> {
        varint::read_zigzag(self)
    }

    /// Consumes four bytes and returns the little-endian `f32` they encode
    ///
    /// The bit pattern is preserved exactly, including NaN payloads.
    fn take_f32(&mut self) -> ParseResult<f32> {
        coerce_slice::<4>(self.consume(4)?).map(f32::from_le_bytes)
    }

    /// Consumes eight bytes and returns the little-endian `f64` they encode
    ///
    /// The bit pattern is preserved exactly, including NaN payloads.
    fn take_f64(&mut self) -> ParseResult<f64> {
        coerce_slice::<8>(self.consume(8)?).map(f64::from_le_bytes)
    }

    /// Consumes a varint length prefix or element count
    fn take_length(&mut self) -> ParseResult<usize> {
        let raw = self.take_varint()?;
        usize::try_from(raw).map_err(|_| ParseError::out_of_range::<usize>(raw))
    }

    /// Consumes a varint length prefix and checks it against [`read_limit`](Parser::read_limit)
    ///
    /// A declared length equal to the limit is accepted.
    fn take_limited_length(&mut self) -> ParseResult<usize> {
        let len = self.take_length()?;
        let limit = self.read_limit();
        if limit != 0 && len > limit {
            log::warn!("[Parser::take_limited_length] declared length {len} exceeds read limit {limit}");
            return Err(LengthError::TooLong { limit, actual: len }.into());
        }
        Ok(len)
    }

    /// Consumes a length-prefixed byte sequence
    fn take_blob(&mut self) -> ParseResult<Vec<u8>> {
        let len = self.take_limited_length()?;
        self.consume(len).map(Vec::from)
    }
}

/// Forwarding implementation, used to turn a `&mut P` with `P: ?Sized` into
/// a `&mut dyn Parser`.
impl<P: Parser + ?Sized> Parser for &mut P {
    fn view_len(&self) -> usize {
        (**self).view_len()
    }

    fn offset(&self) -> usize {
        (**self).offset()
    }

    fn remainder(&self) -> usize {
        (**self).remainder()
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        (**self).consume_byte()
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        (**self).consume(nbytes)
    }

    fn read_limit(&self) -> usize {
        (**self).read_limit()
    }

    fn registry(&self) -> Option<Arc<Registry>> {
        (**self).registry()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }

    fn set_depth(&mut self, depth: usize) {
        (**self).set_depth(depth)
    }

    fn depth_limit(&self) -> usize {
        (**self).depth_limit()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buffer::ByteBuffer;

    #[test]
    fn bool_accepts_any_nonzero() {
        let mut p = ByteBuffer::from(&[0x00, 0x01, 0x7f][..]);
        assert_eq!(p.take_bool(), Ok(false));
        assert_eq!(p.take_bool(), Ok(true));
        assert_eq!(p.take_bool(), Ok(true));
        assert!(p.take_bool().is_err());
    }

    #[test]
    fn failed_consume_does_not_advance() {
        let mut p = ByteBuffer::from(&[1, 2, 3][..]);
        assert_eq!(
            p.consume(4).map(<[u8]>::to_vec),
            Err(ParseError::BufferUnderrun {
                offset: 0,
                requested: 4,
                available: 3
            })
        );
        assert_eq!(p.offset(), 0);
        assert_eq!(p.consume(3).map(<[u8]>::to_vec), Ok(vec![1, 2, 3]));
        assert_eq!(p.remainder(), 0);
    }

    #[test]
    fn floats_are_little_endian() {
        let mut p = ByteBuffer::from(&[0x00, 0x00, 0x80, 0x3f][..]);
        assert_eq!(p.take_f32(), Ok(1.0f32));
    }

    #[test]
    fn length_limit_boundary() {
        let mut bytes = vec![4u8];
        bytes.extend_from_slice(b"asdf");
        let mut p = ByteBuffer::from(bytes.clone()).with_read_limit(4);
        assert_eq!(p.take_blob(), Ok(b"asdf".to_vec()));

        let mut p = ByteBuffer::from(bytes).with_read_limit(3);
        assert_eq!(
            p.take_blob(),
            Err(ParseError::LengthLimitExceeded(LengthError::TooLong {
                limit: 3,
                actual: 4
            }))
        );
    }

    #[test]
    fn nesting_stops_at_limit() {
        let mut p = ByteBuffer::new().with_depth_limit(2);
        assert_eq!(p.enter_nested(), Ok(()));
        assert_eq!(p.enter_nested(), Ok(()));
        assert_eq!(
            p.enter_nested(),
            Err(ParseError::DepthLimitExceeded { offset: 0, limit: 2 })
        );
        assert_eq!(p.depth(), 2);
        p.leave_nested();
        assert_eq!(p.enter_nested(), Ok(()));
        p.leave_nested();
        p.leave_nested();
        p.leave_nested();
        assert_eq!(p.depth(), 0);
    }

    #[test]
    fn dyn_parser_forwards() {
        let mut p = ByteBuffer::from(&[0xac, 0x02][..]);
        let mut fwd = &mut p;
        let erased: &mut dyn Parser = &mut fwd;
        assert_eq!(erased.take_varint(), Ok(300));
        assert_eq!(erased.enter_nested(), Ok(()));
        assert_eq!(erased.depth(), 1);
        assert_eq!(erased.depth_limit(), DEFAULT_DEPTH_LIMIT);
    }
}
