//! Wire forms of the primitive types
//!
//! | Type | Wire form |
//! |---|---|
//! | `bool` | 1 byte, `0` is false, anything else true |
//! | `u8` / `i8` | 1 raw byte |
//! | `i16` / `i32` / `i64` | zigzag, then varint |
//! | `u16` / `u32` / `u64` | varint |
//! | `f32` / `f64` | 4 / 8 bytes little-endian, exact bit pattern |
//! | `String` / `str` | varint byte length, then the bytes |
//! | `Vec<u8>` | varint byte length, then the bytes |
//!
//! Decoding a varint into a narrower integer than it was written from fails
//! with [`ParseError::OutOfRange`] rather than truncating.

use crate::conv::{target::Target, Decode, Encode};
use crate::object::{Message, TypeTag};
use crate::parse::error::ParseError;
use crate::parse::{ParseResult, Parser};
use crate::varint;

impl Encode for bool {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_one(u8::from(*self)) + crate::resolve_zero!(buf)
    }
}

impl Decode for bool {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_bool()
    }
}

impl Encode for u8 {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_one(*self) + crate::resolve_zero!(buf)
    }
}

impl Decode for u8 {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_u8()
    }
}

impl Encode for i8 {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_one(*self as u8) + crate::resolve_zero!(buf)
    }
}

impl Decode for i8 {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_i8()
    }
}

macro_rules! impl_varint_unsigned {
    ( $( $t:ty ),* ) => {
        $(
            impl Encode for $t {
                fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
                    varint::write_varint(u64::from(*self), buf) + crate::resolve_zero!(buf)
                }
            }

            impl Decode for $t {
                fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
                    let raw = p.take_varint()?;
                    <$t>::try_from(raw).map_err(|_| ParseError::out_of_range::<$t>(raw))
                }
            }
        )*
    };
}

macro_rules! impl_varint_signed {
    ( $( $t:ty ),* ) => {
        $(
            impl Encode for $t {
                fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
                    varint::write_zigzag(i64::from(*self), buf) + crate::resolve_zero!(buf)
                }
            }

            impl Decode for $t {
                fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
                    let raw = p.take_zigzag()?;
                    <$t>::try_from(raw).map_err(|_| ParseError::out_of_range::<$t>(raw))
                }
            }
        )*
    };
}

impl_varint_unsigned!(u16, u32, u64);
impl_varint_signed!(i16, i32, i64);

impl Encode for f32 {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_all(&self.to_le_bytes()) + crate::resolve_zero!(buf)
    }
}

impl Decode for f32 {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_f32()
    }
}

impl Encode for f64 {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_all(&self.to_le_bytes()) + crate::resolve_zero!(buf)
    }
}

impl Decode for f64 {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_f64()
    }
}

impl Encode for str {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        varint::write_varint(self.len() as u64, buf) + buf.push_all(self.as_bytes()) + crate::resolve_zero!(buf)
    }
}

impl Encode for String {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        self.as_str().write_to(buf)
    }
}

impl Decode for String {
    /// Reads a length-prefixed byte run, subject to the read limit of `p`
    ///
    /// The bytes are not validated as UTF-8; invalid sequences are replaced
    /// with `U+FFFD` rather than rejected.
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        let buf: Vec<u8> = p.take_blob()?;
        match String::from_utf8(buf) {
            Ok(s) => Ok(s),
            Err(err) => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
        }
    }
}

impl Message for String {
    const TYPE_TAG: TypeTag = TypeTag::STRING;
}

impl Encode for Vec<u8> {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        self.as_slice().write_to(buf)
    }
}

impl Encode for [u8] {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        varint::write_varint(self.len() as u64, buf) + buf.push_all(self) + crate::resolve_zero!(buf)
    }
}

impl Decode for Vec<u8> {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.take_blob()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conv::DecodeError;

    fn check<T>(val: T, bytes: &[u8])
    where
        T: Encode + Decode + PartialEq + std::fmt::Debug,
    {
        assert_eq!(val.to_bytes(), bytes, "encoding {:?}", val);
        assert_eq!(T::try_decode(bytes).unwrap(), val);
    }

    #[test]
    fn fixed_width() {
        check(true, &[0x01]);
        check(false, &[0x00]);
        check(0xffu8, &[0xff]);
        check(-1i8, &[0xff]);
        check(1.0f32, &[0x00, 0x00, 0x80, 0x3f]);
        check(-2.5f64, &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0xc0]);
    }

    #[test]
    fn varint_backed() {
        check(300u16, &[0xac, 0x02]);
        check(10i32, &[0x14]);
        check(-1i16, &[0x01]);
        check(i64::MIN, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        check(u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn strings_and_blobs() {
        check(String::from("asdf"), b"\x04asdf");
        check(String::new(), &[0x00]);
        check(vec![0xdeu8, 0xad], &[0x02, 0xde, 0xad]);
        assert_eq!("asdf".to_bytes(), b"\x04asdf".to_vec());
    }

    #[test]
    fn float_bit_patterns_survive() {
        let odd_nan = f64::from_bits(0x7ff8_0000_dead_beef);
        let back = f64::try_decode(odd_nan.to_bytes()).unwrap();
        assert_eq!(back.to_bits(), odd_nan.to_bits());
        let neg_zero = f32::try_decode((-0.0f32).to_bytes()).unwrap();
        assert_eq!(neg_zero.to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn narrowing_overflow_rejected() {
        let wide = 70_000u32.to_bytes();
        assert!(matches!(
            u16::try_decode(wide),
            Err(DecodeError::Parse(ParseError::OutOfRange { value: 70_000, .. }))
        ));
        let wide = (i32::MIN as i64 - 1).to_bytes();
        assert!(matches!(
            i32::try_decode(wide),
            Err(DecodeError::Parse(ParseError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(String::try_decode(vec![0x02, 0xff, b'a']).unwrap(), "\u{fffd}a");
    }
}
