//! Core of the binary-conversion API
//!
//! This module contains definitions for the high-level transcoding traits
//! `Encode` and `Decode`, which are motivationally equivalent to the
//! `Serialize` and `Deserialize` traits defined in `serde`, but fixed to the
//! single wire format of this crate.
//!
//! `Encode` and `Decode` are the *body* codecs of a type: the fields it
//! holds, in declared order. Object framing (the type tag, or the zero byte
//! of an absent object) is layered on top by [`Object`] and [`DynObject`],
//! which is what lets a derived message embed its base message as an
//! ordinary first field.
//!
//! An additional submodule, [`target`], offers an abstraction along the lines of [`std::io::Write`], namely the
//! [`target::Target`] trait. This is the dual to [`crate::parse::Parser`], acting as the generic
//! bound for serialization in the [`Encode::write_to`] method.
//!
//! Derive macros for `Encode` and `Decode` are provided in the sub-crates `encode_derive`
//! and `decode_derive`, and generate field-by-field implementations for structs.
//!
//! # Nullable values
//!
//! `Option<T>` is the nullable form of every encodable `T`. It is framed by a
//! one-byte presence marker: `0x00` for `None`, `0x01` followed by the body
//! of `T` for `Some`. The rule is uniform, strings included.
//!
//! [`Object`]: crate::object::Object
//! [`DynObject`]: crate::object::DynObject

use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::object::registry::Registry;
use crate::parse::{ParseResult, Parser};

use self::target::Target;

pub mod error;
pub mod target;

pub use error::{DecodeError, DecodeResult};

/// Presence marker written before the value of a present nullable
pub const PRESENT: u8 = 0x01;

/// Presence marker of an absent nullable, and the tag byte of an absent object
pub const ABSENT: u8 = 0x00;

/// Sums the `write_to` results of several values written in sequence.
#[macro_export]
macro_rules! write_all_to {
    ($($x:expr),* $(,)? => $tgt:expr) => {
        { $( $x.write_to($tgt) + )* $crate::conv::target::Target::resolve_zero($tgt) }
    };
}

/// Trait for types that support serialization into the wire format
///
/// Implementing [`Encode`] can be as simple as providing a definition of the required method
/// [`write_to`](Encode::write_to); the remaining methods have default implementations in
/// terms of it.
pub trait Encode {
    /// Appends the serialized bytes of this value to a generic buffer,
    /// returning the exact number of bytes written
    ///
    /// Morally related to the trait method [`std::io::Write::write`], with the caveat
    /// that `write_to` is infallible, as well as being generic over any buffer,
    /// including `dyn Target`.
    ///
    /// The natural definition of this method is structurally inductive on the
    /// fields of the type in question, in declared order.
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize;

    /// Appends the serialized bytes of this value to a monomorphized [`Vec<u8>`] buffer.
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Creates a new buffer and fills it with the serialized bytes of this value.
    #[must_use]
    #[inline]
    fn encode<U: Target + Default>(&self) -> U {
        let mut buf: U = U::default();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Creates a [`Vec<u8>`] and fills it with the serialized bytes of this value.
    #[must_use]
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to_vec(&mut buf);
        buf
    }
}

/// Extension trait for `Encode` that makes use of serialization-length oracles
///
/// The exact number of bytes in the serialized version of a value is computed
/// by writing it into the zero-allocation target [`ByteCounter`](target::ByteCounter).
pub trait EncodeLength: Encode {
    /// Computes, without allocation, the number of bytes in the serialized
    /// form of `self`.
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }

    /// Returns a `Vec<u8>` allocated to exactly the serialized length of `self`,
    /// containing the serialized bytes of `self`
    #[must_use]
    fn to_bytes_full(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.enc_len());
        self.write_to_vec(&mut buf);
        buf
    }
}

impl<T: Encode + ?Sized> EncodeLength for T {}

/// Trait providing methods for deserializing binary data into values of a certain type
///
/// Implementations are defined by one required method, [`parse`](Decode::parse),
/// which attempts to consume the contextually appropriate number of bytes from a
/// [`Parser`], either returning a valid value of the implementing type, or an
/// error if parsing failed.
///
/// # Derive Macro
///
/// This crate provides a derive-macro `Decode` that is suitable for
/// implementing `Decode` on structs, reading fields in declared order.
///
/// # Example
///
/// A typical hand-written implementation of `Decode` is provided below:
///
/// ```
/// use bbuf::parse::{Parser, ParseResult};
/// use bbuf::Decode;
///
/// #[derive(Debug, PartialEq)]
/// pub struct Point {
///     visible: bool,
///     x: i32,
/// }
///
/// impl Decode for Point {
///     fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
///         Ok(Self {
///             visible: bool::parse(p)?,
///             x: i32::parse(p)?,
///         })
///     }
/// }
///
/// assert_eq!(
///     Point::try_decode(vec![0x01, 0x03]).unwrap(),
///     Point { visible: true, x: -2 }
/// );
/// ```
pub trait Decode {
    /// Attempt to consume and interpret a value of type `Self` from an existing
    /// `Parser` object.
    ///
    /// # Errors
    ///
    /// In most cases, the errors returned by this method will be propagated from
    /// calls made to [`Parser`] methods in the implementation logic.
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Decodes a top-level value of type `Self` from a [`ByteBuffer`],
    /// starting at its current read offset.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by [`parse`](Decode::parse).
    ///
    /// In addition, if the feature-flag `check_complete_parse` is enabled,
    /// returns [`DecodeError::NonEmpty`] when bytes remain unread after the
    /// value.
    fn decode_from(p: &mut ByteBuffer) -> DecodeResult<Self>
    where
        Self: Sized,
    {
        let ret = Self::parse(p)?;
        cfg_if::cfg_if! {
            if #[cfg(feature = "check_complete_parse")] {
                let residual = p.remainder();
                if residual != 0 {
                    return Err(DecodeError::NonEmpty { residual });
                }
            }
        }
        Ok(ret)
    }

    /// Decodes a value of type `Self` from anything convertible into a
    /// [`ByteBuffer`], with no read limit and no registry.
    fn try_decode<B: Into<ByteBuffer>>(input: B) -> DecodeResult<Self>
    where
        Self: Sized,
    {
        Self::decode_from(&mut input.into())
    }

    /// Decodes a value of type `Self`, resolving polymorphic object slots
    /// through `registry`.
    fn try_decode_with<B: Into<ByteBuffer>>(input: B, registry: Arc<Registry>) -> DecodeResult<Self>
    where
        Self: Sized,
    {
        let buf: ByteBuffer = input.into();
        Self::decode_from(&mut buf.with_registry(registry))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        (match self {
            Some(val) => buf.push_one(PRESENT) + val.write_to(buf),
            None => buf.push_one(ABSENT),
        }) + crate::resolve_zero!(buf)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        if p.take_presence()? {
            Ok(Some(T::parse(p)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        (**self).write_to(buf)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        p.enter_nested()?;
        let ret = T::parse(p);
        p.leave_nested();
        ret.map(Box::new)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::error::ParseError;

    #[test]
    fn nullable_framing() {
        assert_eq!(None::<i32>.to_bytes(), vec![0x00]);
        assert_eq!(Some(20i32).to_bytes(), vec![0x01, 0x28]);
        assert_eq!(Some(String::from("asdf")).to_bytes(), b"\x01\x04asdf".to_vec());
        assert_eq!(None::<String>.to_bytes(), vec![0x00]);
    }

    #[test]
    fn nullable_roundtrip() {
        for v in [None, Some(0u16), Some(u16::MAX)] {
            assert_eq!(Option::<u16>::try_decode(v.to_bytes()).unwrap(), v);
        }
        for v in [None, Some(f64::NAN.to_bits()), Some(0)] {
            assert_eq!(Option::<u64>::try_decode(v.to_bytes()).unwrap(), v);
        }
        let nested: Option<Option<bool>> = Some(None);
        assert_eq!(nested.to_bytes(), vec![0x01, 0x00]);
        assert_eq!(Option::<Option<bool>>::try_decode(nested.to_bytes()).unwrap(), nested);
    }

    #[test]
    fn nullable_missing_payload() {
        assert!(matches!(
            Option::<i32>::try_decode(vec![0x01]),
            Err(DecodeError::Parse(ParseError::BufferUnderrun { .. }))
        ));
    }

    #[test]
    fn enc_len_matches_bytes() {
        let v = Some(String::from("hello"));
        assert_eq!(v.enc_len(), v.to_bytes().len());
        assert_eq!(v.to_bytes_full(), v.to_bytes());
    }

    #[test]
    fn encode_into_buffer() {
        let bb: ByteBuffer = 300u32.encode();
        assert_eq!(bb.as_slice(), &[0xac, 0x02]);
    }
}
