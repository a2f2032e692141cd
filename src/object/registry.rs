//! Tag-to-decoder table for polymorphic object slots
//!
//! A [`Registry`] is populated once, before any decoding, and then shared
//! read-only (usually as an `Arc<Registry>` attached to each
//! [`ByteBuffer`](crate::buffer::ByteBuffer)). Every tag maps to exactly one
//! decoder; registering a second decoder under a bound tag is an error
//! rather than an overwrite.
//!
//! Generated message modules typically hold a process-wide registry:
//!
//! ```
//! use std::sync::Arc;
//! use bbuf::prelude::*;
//!
//! lazy_static! {
//!     static ref REGISTRY: Arc<Registry> = Registry::with_builtins().into_shared();
//! }
//!
//! assert!(REGISTRY.contains(TypeTag::STRING.get()));
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::conv::ABSENT;
use crate::error::RegistryError;
use crate::parse::error::TagError;
use crate::parse::{ParseResult, Parser};

use super::{DynMessage, Message, TypeTag};

/// Decoder for the body of one message type, erased to a boxed [`DynMessage`]
pub type DecodeFn = fn(&mut dyn Parser) -> ParseResult<Box<dyn DynMessage>>;

#[derive(Clone, Copy)]
struct Entry {
    name: &'static str,
    decode: DecodeFn,
}

fn decode_boxed<T: Message>(p: &mut dyn Parser) -> ParseResult<Box<dyn DynMessage>> {
    Ok(Box::new(T::parse(p)?))
}

/// Mapping from type tag to body decoder
#[derive(Clone, Default)]
pub struct Registry {
    entries: BTreeMap<u8, Entry>,
}

impl Registry {
    /// Creates an empty registry, leaving every non-zero tag available
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in `String` and `ByteBuffer` messages
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut ret = Self::new();
        ret.insert(TypeTag::STRING.get(), std::any::type_name::<String>(), decode_boxed::<String>);
        ret.insert(
            TypeTag::BYTE_BUFFER.get(),
            std::any::type_name::<ByteBuffer>(),
            decode_boxed::<ByteBuffer>,
        );
        ret
    }

    /// Registers the body decoder of `T` under `T::TYPE_TAG`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Collision`] if the tag is already bound,
    /// even to `T` itself.
    pub fn register<T: Message>(&mut self) -> Result<&mut Self, RegistryError> {
        self.register_raw(T::TYPE_TAG.get(), std::any::type_name::<T>(), decode_boxed::<T>)
    }

    /// Registers an arbitrary decoder under `tag`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ReservedTag`] for tag `0`, and
    /// [`RegistryError::Collision`] if the tag is already bound.
    pub fn register_raw(
        &mut self,
        tag: u8,
        name: &'static str,
        decode: DecodeFn,
    ) -> Result<&mut Self, RegistryError> {
        if tag == ABSENT {
            log::warn!("[Registry::register_raw] refusing reserved tag 0 for {name}");
            return Err(RegistryError::ReservedTag { name });
        }
        if let Some(existing) = self.entries.get(&tag) {
            log::warn!(
                "[Registry::register_raw] tag {tag} already bound to {}, refusing {name}",
                existing.name
            );
            return Err(RegistryError::Collision {
                tag,
                existing: existing.name,
                incoming: name,
            });
        }
        self.insert(tag, name, decode);
        Ok(self)
    }

    fn insert(&mut self, tag: u8, name: &'static str, decode: DecodeFn) {
        log::debug!("[Registry::insert] tag {tag} -> {name}");
        self.entries.insert(tag, Entry { name, decode });
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Type name registered under `tag`
    pub fn name_of(&self, tag: u8) -> Option<&'static str> {
        self.entries.get(&tag).map(|entry| entry.name)
    }

    /// All bound tags, in ascending order
    pub fn tags(&self) -> Vec<u8> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes the body of the message bound to `tag`, the tag byte itself
    /// having already been consumed
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownTypeTag`](crate::parse::error::ParseError::UnknownTypeTag)
    /// if nothing is bound to `tag`, listing the bound tags, and otherwise
    /// propagates the error of the decoder.
    pub fn decode_body(&self, tag: u8, p: &mut dyn Parser) -> ParseResult<Box<dyn DynMessage>> {
        match self.entries.get(&tag) {
            Some(entry) => (entry.decode)(p),
            None => {
                log::debug!(
                    "[Registry::decode_body] no decoder for tag {tag} at offset {}",
                    p.offset()
                );
                Err(TagError::new(tag, "DynObject", Some(self.tags())).into())
            }
        }
    }

    /// Wraps the finished registry for attachment to buffers
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(tag, entry)| (tag, entry.name)))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conv::Encode;
    use crate::parse::error::ParseError;

    fn decode_nothing(_: &mut dyn Parser) -> ParseResult<Box<dyn DynMessage>> {
        Ok(Box::new(String::new()))
    }

    #[test]
    fn builtins() {
        let reg = Registry::with_builtins();
        assert_eq!(reg.tags(), vec![1, 2]);
        assert_eq!(reg.name_of(1), Some(std::any::type_name::<String>()));
        assert!(Registry::new().is_empty());
    }

    #[test]
    fn collision_rejected() {
        let mut reg = Registry::with_builtins();
        assert_eq!(
            reg.register::<String>().map(|r| r.len()),
            Err(RegistryError::Collision {
                tag: 1,
                existing: std::any::type_name::<String>(),
                incoming: std::any::type_name::<String>(),
            })
        );
        assert!(matches!(
            reg.register_raw(2, "Other", decode_nothing),
            Err(RegistryError::Collision { tag: 2, .. })
        ));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn reserved_tag_rejected() {
        let mut reg = Registry::new();
        assert_eq!(
            reg.register_raw(0, "Nothing", decode_nothing).map(|r| r.len()),
            Err(RegistryError::ReservedTag { name: "Nothing" })
        );
    }

    #[test]
    fn chained_registration() {
        let mut reg = Registry::new();
        let res = reg
            .register::<String>()
            .and_then(|r| r.register_raw(9, "Nothing", decode_nothing))
            .map(|r| r.len());
        assert_eq!(res, Ok(2));
        assert_eq!(format!("{:?}", reg), format!("{{1: {:?}, 9: \"Nothing\"}}", std::any::type_name::<String>()));
    }

    #[test]
    fn unknown_tag_lists_bound_tags() {
        let reg = Registry::with_builtins();
        let mut p = ByteBuffer::from(vec![0x00]);
        match reg.decode_body(7, &mut p) {
            Err(ParseError::UnknownTypeTag(err)) => {
                assert_eq!(err.actual(), 7);
                assert_eq!(err.expected(), Some(&[1u8, 2][..]));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn dispatch_by_tag() {
        let reg = Registry::with_builtins();
        let mut p = ByteBuffer::from(String::from("ok").to_bytes());
        let msg = reg.decode_body(1, &mut p).unwrap();
        assert_eq!(msg.downcast_ref::<String>().map(String::as_str), Some("ok"));
    }
}
