//! Glob-import surface for generated message modules
//!
//! `use bbuf::prelude::*;` brings in the codec traits together with their
//! derive macros, the object and collection types, and `lazy_static!` for
//! declaring a shared registry.

pub use crate::buffer::ByteBuffer;
pub use crate::conv::{Decode, Encode, EncodeLength};
pub use crate::object::{registry::Registry, DynObject, Message, Object, TypeTag};
pub use crate::parse::{ParseResult, Parser};
pub use crate::seq::{List, NullableList};

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
pub use ::lazy_static::lazy_static;
