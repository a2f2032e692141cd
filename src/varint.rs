//! Base-128 variable-length integers and the zigzag signed mapping
//!
//! An unsigned value is written as a series of 7-bit groups, least-significant
//! group first. Every byte but the last has its high bit set as a continuation
//! flag:
//!
//! ```
//! # use bbuf::varint::encode_varint;
//! assert_eq!(encode_varint(300), vec![0xac, 0x02]);
//! ```
//!
//! Signed values are first mapped onto unsigned ones with the zigzag
//! bijection `(v << 1) ^ (v >> 63)`, so that small magnitudes of either sign
//! stay short on the wire.
//!
//! The decoder reads at most [`MAX_VARINT_LEN`] bytes, which is enough for
//! the full 64-bit range; anything longer, or a tenth byte carrying bits that
//! would land above bit 63, is reported as
//! [`ParseError::MalformedVarint`].

use crate::conv::target::Target;
use crate::parse::error::{ParseError, ParseResult};
use crate::parse::Parser;

/// Maximum number of bytes in the varint encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// Maps a signed value onto the unsigned zigzag domain
///
/// `0, -1, 1, -2, 2, ...` map to `0, 1, 2, 3, 4, ...`.
#[inline]
#[must_use]
pub const fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// Inverse of [`zigzag_encode`]
#[inline]
#[must_use]
pub const fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

/// Number of bytes [`write_varint`] emits for `v`
#[must_use]
pub const fn varint_len(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        (bits + 6) / 7
    }
}

/// Appends the varint encoding of `v` to `buf`, returning the number of bytes written
pub fn write_varint<U: Target + ?Sized>(mut v: u64, buf: &mut U) -> usize {
    let mut bytes = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    while v >= 0x80 {
        bytes[len] = (v as u8 & 0x7f) | 0x80;
        v >>= 7;
        len += 1;
    }
    bytes[len] = v as u8;
    len += 1;
    buf.push_all(&bytes[..len])
}

/// Appends the zigzag-varint encoding of `v` to `buf`
#[inline]
pub fn write_zigzag<U: Target + ?Sized>(v: i64, buf: &mut U) -> usize {
    write_varint(zigzag_encode(v), buf)
}

/// Returns the varint encoding of `v` as a fresh vector
#[must_use]
pub fn encode_varint(v: u64) -> Vec<u8> {
    let mut ret = Vec::with_capacity(varint_len(v));
    write_varint(v, &mut ret);
    ret
}

/// Consumes one varint from `p`
///
/// # Errors
///
/// Returns [`ParseError::BufferUnderrun`] if the input ends before a
/// terminating byte, and [`ParseError::MalformedVarint`] if no terminating
/// byte appears within [`MAX_VARINT_LEN`] bytes or the value overflows 64 bits.
pub fn read_varint<P: Parser + ?Sized>(p: &mut P) -> ParseResult<u64> {
    let mut ret: u64 = 0;
    let mut seen = [0u8; MAX_VARINT_LEN];
    for (ix, shift) in (0..64).step_by(7).enumerate() {
        let byte = p.consume_byte()?;
        seen[ix] = byte;
        let group = u64::from(byte & 0x7f);
        // the final group has room for one bit only
        if ix == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(ParseError::MalformedVarint(seen.to_vec()));
        }
        ret |= group << shift;
        if byte & 0x80 == 0 {
            return Ok(ret);
        }
    }
    Err(ParseError::MalformedVarint(seen.to_vec()))
}

/// Consumes one zigzag-varint from `p`
#[inline]
pub fn read_zigzag<P: Parser + ?Sized>(p: &mut P) -> ParseResult<i64> {
    read_varint(p).map(zigzag_decode)
}
