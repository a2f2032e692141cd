//! Byte-buffer wire codec for generated message types
//!
//! # Overview
//!
//! This library is the runtime half of a message code generator. Generated
//! modules declare plain Rust structs for their message types, derive
//! [`Encode`] and [`Decode`] for them, and assign each one a stable one-byte
//! [`TypeTag`]; everything else (byte layout, nullability, polymorphic
//! dispatch) is handled here, so that every generated type honours the same
//! byte-exact wire contract.
//!
//! The wire format is built from a small set of pieces:
//!
//! * **varints**: unsigned integers as base-128 groups, least-significant
//!   first, at most ten bytes for the full 64-bit range. Signed integers go
//!   through the zigzag mapping first (see [`varint`]).
//! * **primitives**: bools and bytes as single bytes, floats as
//!   little-endian IEEE-754 bit patterns, strings and blobs as a varint
//!   length followed by the raw bytes (see [`prim`]).
//! * **nullable values**: `Option<T>`, framed by one presence byte,
//!   `0x00` for absent and `0x01` followed by the value for present.
//! * **objects**: a one-byte type tag (`0` meaning absent) followed by the
//!   body of the message. Statically typed slots use [`Object<T>`];
//!   polymorphic slots use [`DynObject`] and decode through a [`Registry`]
//!   that maps tags to decoders.
//! * **collections**: [`List<T>`], a varint element count followed by the
//!   elements, nullable through `Option<List<T>>`.
//!
//! A derived message type holds its base message as its first field. Since
//! message bodies carry no tag of their own, this serializes the base fields
//! in full, followed by the derived-only fields.
//!
//! # Example
//!
//! ```
//! use bbuf::prelude::*;
//!
//! #[derive(Encode, Decode, Clone, PartialEq, Debug)]
//! pub struct Foo {
//!     pub id: i32,
//!     pub name: Option<String>,
//!     pub age: Option<i32>,
//! }
//!
//! impl Message for Foo {
//!     const TYPE_TAG: TypeTag = TypeTag::of(3);
//! }
//!
//! let foo = Foo { id: 10, name: Some("asdf".into()), age: Some(20) };
//! let bytes = Object::new(foo.clone()).to_bytes();
//! assert_eq!(bytes, vec![3, 0x14, 1, 4, b'a', b's', b'd', b'f', 1, 0x28]);
//!
//! let mut registry = Registry::with_builtins();
//! registry.register::<Foo>().unwrap();
//!
//! let back = DynObject::try_decode_with(bytes, registry.into_shared()).unwrap();
//! assert_eq!(back.get::<Foo>(), Some(&foo));
//! ```
//!
//! # Buffers and sessions
//!
//! All reading goes through the [`Parser`] trait and all writing through the
//! [`Target`] trait; [`ByteBuffer`] implements both, and additionally
//! carries the per-session configuration: an optional read limit on string
//! and blob lengths, a limit on how deeply objects, lists and boxes may
//! nest, and the registry used by polymorphic slots. A buffer is
//! owned by one encode or decode session at a time. A finished [`Registry`]
//! is immutable and can be shared freely behind an `Arc`.
//!
//! # Errors
//!
//! Encoding is infallible. Decoding reports every malformed input as a
//! [`ParseError`]: reading past the end of the buffer, a varint longer than
//! ten bytes, a length prefix above the read limit, nesting past the depth
//! limit, an unknown type tag, or an integer that does not fit its declared
//! type. No decode path panics on untrusted input, and the work done is
//! bounded by the input length whatever counts it declares.

extern crate decode_derive;
extern crate encode_derive;
extern crate self as bbuf;

pub mod buffer;
pub mod conv;
pub mod error;
pub mod object;
pub mod parse;
pub mod prelude;
pub mod prim;
pub mod seq;
pub mod varint;

pub use crate::buffer::ByteBuffer;
pub use crate::conv::{target::Target, Decode, DecodeError, DecodeResult, Encode, EncodeLength};
pub use crate::error::{LengthError, RegistryError};
pub use crate::object::{registry::Registry, DynMessage, DynObject, Message, Object, TypeTag};
pub use crate::parse::{
    error::{ParseError, TagError},
    ParseResult, Parser,
};
pub use crate::seq::{List, NullableList};

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
pub use ::lazy_static::lazy_static;
