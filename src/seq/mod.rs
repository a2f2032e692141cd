//! Ordered, count-prefixed collections
//!
//! A [`List<T>`] is written as a varint element count followed by the
//! elements in order. The default element type is [`DynObject`], which gives
//! the mixed-type collection of the wire format: every element is a
//! (possibly absent) tagged object.
//!
//! The collection itself is nullable through `Option`, and the presence
//! marker sits in front of the count:
//!
//! ```text
//! NullableList := 0x00 | 0x01 varint(count) element*
//! ```
//!
//! Decoding never pre-allocates for more elements than there are bytes left
//! in the input, so a hostile count cannot force a large allocation.

use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

#[cfg(feature = "serde_impls")]
use serde::Serialize;

use crate::conv::{target::Target, Decode, Encode};
use crate::object::{DynObject, Message, TypeTag};
use crate::parse::error::ParseError;
use crate::parse::{ParseResult, Parser};
use crate::varint;

/// Count-prefixed sequence of `T`
#[derive(Clone, Debug, PartialEq)]
pub struct List<T = DynObject>(Vec<T>);

/// A list together with its presence marker
pub type NullableList<T = DynObject> = Option<List<T>>;

impl<T> List<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item)
    }

    /// Removes the element at `index` in O(1) by moving the last element
    /// into its place
    ///
    /// The relative order of the remaining elements is not preserved.
    /// Returns `None`, leaving the list unchanged, if `index` is out of range.
    pub fn swap_remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.0.len() {
            Some(self.0.swap_remove(index))
        } else {
            None
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl List<DynObject> {
    /// Appends a present object holding `val`
    pub fn push_object<M: Message>(&mut self, val: M) {
        self.0.push(DynObject::new(val))
    }

    /// Appends an absent object slot
    pub fn push_absent(&mut self) {
        self.0.push(DynObject::absent())
    }

    /// Typed access to slot `index`
    ///
    /// Returns `None` if the index is out of range, the slot is absent, or
    /// the slot holds a message of another type.
    pub fn at<M: Message>(&self, index: usize) -> Option<&M> {
        self.0.get(index).and_then(DynObject::get::<M>)
    }

    /// Tag of each slot in order, `None` for absent slots
    pub fn tags(&self) -> Vec<Option<TypeTag>> {
        self.0.iter().map(DynObject::type_tag).collect()
    }
}

#[cfg(feature = "serde_impls")]
impl<T: Serialize> Serialize for List<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
        self.0.serialize(serializer)
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for List<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for List<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> From<List<T>> for Vec<T> {
    fn from(list: List<T>) -> Self {
        list.0
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Encode> Encode for List<T> {
    fn write_to<U: Target + ?Sized>(&self, buf: &mut U) -> usize {
        let mut ret = varint::write_varint(self.0.len() as u64, buf);
        for item in self.0.iter() {
            ret += item.write_to(buf);
        }
        ret + crate::resolve_zero!(buf)
    }
}

impl<T: Decode> Decode for List<T> {
    /// Reads a varint count and then that many elements
    ///
    /// An element that consumes no input is only accepted while the number
    /// of elements still to read does not exceed the bytes left, so the loop
    /// runs at most about twice the input length regardless of the declared
    /// count.
    fn parse<P: Parser + ?Sized>(p: &mut P) -> ParseResult<Self> {
        let count = p.take_length()?;
        p.enter_nested()?;
        let ret = parse_elements(p, count);
        p.leave_nested();
        ret.map(Self)
    }
}

fn parse_elements<T: Decode, P: Parser + ?Sized>(p: &mut P, count: usize) -> ParseResult<Vec<T>> {
    let mut items = Vec::with_capacity(count.min(p.remainder()));
    for ix in 0..count {
        let start = p.offset();
        items.push(T::parse(p)?);
        let left = count - ix - 1;
        if p.offset() == start && left > p.remainder() {
            log::warn!(
                "[List::parse] zero-width element with {left} still declared at offset {start}"
            );
            return Err(ParseError::underrun(start, left, p.remainder()));
        }
    }
    Ok(items)
}
