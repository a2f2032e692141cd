//! General error types
//!
//! This module contains the error types that are not tied to the
//! [`Parser`](crate::parse::Parser) model directly, but are either embedded
//! into [`ParseError`](crate::parse::error::ParseError) or returned by
//! non-parsing operations such as registry population.

use std::error::Error;
use std::fmt::Display;

/// Enumerated error type for failures related to constructs that impose a
/// check on the declared byte-length of a length-prefixed value.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Restriction on maximum byte-length exceeded
    TooLong { limit: usize, actual: usize },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(f, "declared length {actual} exceeds limit of {limit} bytes")
            }
        }
    }
}

impl Error for LengthError {}

/// Errors raised while populating a [`Registry`](crate::object::registry::Registry)
///
/// Registration happens ahead of any decoding, so these are programming
/// errors in the set of message types, never a property of the input.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RegistryError {
    /// Tag `0` is reserved for absent objects and cannot name a type
    ReservedTag { name: &'static str },
    /// The tag is already bound to another decoder
    Collision {
        tag: u8,
        existing: &'static str,
        incoming: &'static str,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ReservedTag { name } => {
                write!(f, "cannot register {name}: tag 0 is reserved for absent objects")
            }
            RegistryError::Collision {
                tag,
                existing,
                incoming,
            } => {
                write!(
                    f,
                    "cannot register {incoming} under tag {tag}: already bound to {existing}"
                )
            }
        }
    }
}

impl Error for RegistryError {}
