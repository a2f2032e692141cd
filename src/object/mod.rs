//! Type-tagged object slots
//!
//! A message type is any type implementing [`Message`]: a body codec
//! ([`Encode`] + [`Decode`]) plus a stable, non-zero [`TypeTag`]. Message
//! bodies never carry their own tag. The tag is written by the slot that
//! holds the message:
//!
//! * [`Object<T>`] is a statically typed slot. It writes `0x00` when empty or
//!   `T::TYPE_TAG` followed by the body, and on decode accepts only those two
//!   tags.
//! * [`DynObject`] is a polymorphic slot. It writes the tag of whatever
//!   message it holds, and on decode resolves the tag through the
//!   [`Registry`](registry::Registry) attached to the parser.
//!
//! ```
//! use bbuf::prelude::*;
//!
//! let slot = DynObject::new(String::from("hi"));
//! assert_eq!(slot.to_bytes(), vec![0x01, 0x02, b'h', b'i']);
//!
//! let back = DynObject::try_decode_with(slot.to_bytes(), Registry::with_builtins().into_shared()).unwrap();
//! assert_eq!(back.get::<String>().map(String::as_str), Some("hi"));
//! ```

use std::any::Any;
use std::fmt::{Debug, Display};
use std::num::NonZeroU8;

#[cfg(feature = "serde_impls")]
use serde::Serialize;

use crate::conv::target::Target;
use crate::conv::{Decode, Encode, ABSENT};
use crate::parse::error::TagError;
use crate::parse::{ParseResult, Parser};

pub mod registry;

/// Non-zero one-byte identifier of a message type
///
/// Tag `0` is not representable; it is the wire marker of an absent object
/// and is exposed as the plain byte [`TypeTag::ABSENT`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeTag(NonZeroU8);

impl TypeTag {
    /// Tag byte of an absent object
    pub const ABSENT: u8 = ABSENT;

    /// Built-in `String` message
    pub const STRING: TypeTag = TypeTag::of(1);

    /// Built-in nested [`ByteBuffer`](crate::buffer::ByteBuffer) message
    pub const BYTE_BUFFER: TypeTag = TypeTag::of(2);

    /// Lowest tag not claimed by a built-in message
    pub const FIRST_USER: TypeTag = TypeTag::of(3);

    /// Constructs a tag from a byte known to be non-zero
    ///
    /// # Panics
    ///
    /// Panics if `tag == 0`. In a `const` item this is a compile-time error.
    #[must_use]
    pub const fn of(tag: u8) -> Self {
        match NonZeroU8::new(tag) {
            Some(tag) => Self(tag),
            None => panic!("type tag 0 is reserved for absent objects"),
        }
    }

    /// Constructs a tag, returning `None` for the reserved byte `0`
    #[must_use]
    pub const fn new(tag: u8) -> Option<Self> {
        match NonZeroU8::new(tag) {
            Some(tag) => Some(Self(tag)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl From<TypeTag> for u8 {
    fn from(tag: TypeTag) -> Self {
        tag.get()
    }
}

#[cfg(feature = "serde_impls")]
impl Serialize for TypeTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
        serializer.serialize_u8(self.get())
    }
}

#[cfg(feature = "serde_impls")]
impl<T: Message + Serialize> Serialize for Object<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
        self.0.serialize(serializer)
    }
}

impl Encode for TypeTag {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        buf.push_one(self.get()) + crate::resolve_zero!(buf)
    }
}

/// A type that can occupy an object slot
///
/// Implementations are normally a derive of `Encode` and `Decode` plus one
/// line naming the tag:
///
/// ```
/// use bbuf::prelude::*;
///
/// #[derive(Encode, Decode, Clone, PartialEq, Debug)]
/// pub struct Ping {
///     pub seq: u32,
/// }
///
/// impl Message for Ping {
///     const TYPE_TAG: TypeTag = TypeTag::of(7);
/// }
///
/// assert_eq!(Object::new(Ping { seq: 1 }).to_bytes(), vec![7, 1]);
/// ```
///
/// A derived message holds its base message as its first field, so that
/// the base body is written in full before the derived-only fields.
pub trait Message: Encode + Decode + Clone + PartialEq + Debug + Send + Sync + 'static {
    const TYPE_TAG: TypeTag;
}

/// Object-safe view of a [`Message`]
///
/// Every `Message` implements this trait; it is what a [`DynObject`] holds
/// and what registry decoders return.
pub trait DynMessage: Any + Debug + Send + Sync {
    fn type_tag(&self) -> TypeTag;

    fn type_name(&self) -> &'static str;

    /// Writes the message body (without tag) into a type-erased target
    fn write_body(&self, buf: &mut dyn Target) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_boxed(&self) -> Box<dyn DynMessage>;

    /// Equality across erased messages: same concrete type and equal values
    fn dyn_eq(&self, other: &dyn DynMessage) -> bool;
}

impl<T: Message> DynMessage for T {
    fn type_tag(&self) -> TypeTag {
        T::TYPE_TAG
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn write_body(&self, buf: &mut dyn Target) -> usize {
        self.write_to(buf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn DynMessage> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynMessage) -> bool {
        other.as_any().downcast_ref::<T>().map_or(false, |other| self == other)
    }
}

impl dyn DynMessage {
    /// Returns `true` if the erased message is a `T`
    ///
    /// The tag is compared before the concrete type.
    pub fn is<T: Message>(&self) -> bool {
        self.type_tag() == T::TYPE_TAG && self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        if self.type_tag() != T::TYPE_TAG {
            return None;
        }
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Message>(&mut self) -> Option<&mut T> {
        if self.type_tag() != T::TYPE_TAG {
            return None;
        }
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn DynMessage> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl PartialEq for dyn DynMessage {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Encode for dyn DynMessage {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        self.write_body(&mut &mut *buf)
    }
}

/// Statically typed, possibly absent object slot
///
/// Wire form: `0x00` when absent, otherwise `T::TYPE_TAG` followed by the
/// body of `T`. Any other tag is rejected with
/// [`ParseError::UnknownTypeTag`](crate::parse::error::ParseError::UnknownTypeTag).
#[derive(Clone, PartialEq, Debug)]
pub struct Object<T: Message>(pub Option<T>);

impl<T: Message> Object<T> {
    #[must_use]
    pub fn new(val: T) -> Self {
        Self(Some(val))
    }

    #[must_use]
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.0.as_mut()
    }

    #[must_use]
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T: Message> Default for Object<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T: Message> From<T> for Object<T> {
    fn from(val: T) -> Self {
        Self(Some(val))
    }
}

impl<T: Message> From<Option<T>> for Object<T> {
    fn from(val: Option<T>) -> Self {
        Self(val)
    }
}

impl<T: Message> Encode for Object<T> {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        (match &self.0 {
            Some(val) => T::TYPE_TAG.write_to(buf) + val.write_to(buf),
            None => buf.push_one(ABSENT),
        }) + crate::resolve_zero!(buf)
    }
}

impl<T: Message> Decode for Object<T> {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        match p.take_u8()? {
            ABSENT => Ok(Self(None)),
            tag if tag == T::TYPE_TAG.get() => {
                p.enter_nested()?;
                let body = T::parse(p);
                p.leave_nested();
                Ok(Self(Some(body?)))
            }
            tag => Err(TagError::with_type::<T>(tag, Some(vec![T::TYPE_TAG.get()])).into()),
        }
    }
}

/// Polymorphic, possibly absent object slot
///
/// Wire form: `0x00` when absent, otherwise the tag of the held message
/// followed by its body. Decoding dispatches on the tag through the
/// registry attached to the parser; a parser without a registry can only
/// decode absent slots.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DynObject(pub Option<Box<dyn DynMessage>>);

impl DynObject {
    #[must_use]
    pub fn new<T: Message>(val: T) -> Self {
        Self(Some(Box::new(val)))
    }

    #[must_use]
    pub fn absent() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn from_boxed(val: Box<dyn DynMessage>) -> Self {
        Self(Some(val))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Tag of the held message, or `None` when absent
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.0.as_ref().map(|val| val.type_tag())
    }

    pub fn as_dyn(&self) -> Option<&dyn DynMessage> {
        self.0.as_deref()
    }

    /// Typed access to the held message; `None` if absent or of another type
    pub fn get<T: Message>(&self) -> Option<&T> {
        self.0.as_deref().and_then(<dyn DynMessage>::downcast_ref::<T>)
    }

    pub fn get_mut<T: Message>(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut().and_then(<dyn DynMessage>::downcast_mut::<T>)
    }

    #[must_use]
    pub fn into_inner(self) -> Option<Box<dyn DynMessage>> {
        self.0
    }
}

impl<T: Message> From<Object<T>> for DynObject {
    fn from(obj: Object<T>) -> Self {
        Self(obj.0.map(|val| Box::new(val) as Box<dyn DynMessage>))
    }
}

impl Encode for DynObject {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        (match &self.0 {
            Some(val) => val.type_tag().write_to(buf) + val.write_body(&mut &mut *buf),
            None => buf.push_one(ABSENT),
        }) + crate::resolve_zero!(buf)
    }
}

impl Decode for DynObject {
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        let tag = p.take_u8()?;
        if tag == ABSENT {
            return Ok(Self(None));
        }
        match p.registry() {
            Some(registry) => {
                p.enter_nested()?;
                let body = registry.decode_body(tag, &mut &mut *p);
                p.leave_nested();
                body.map(Self::from_boxed)
            }
            None => {
                log::debug!("[DynObject::parse] tag {tag} at offset {} with no registry attached", p.offset());
                Err(TagError::with_type::<Self>(tag, Some(Vec::new())).into())
            }
        }
    }
}
