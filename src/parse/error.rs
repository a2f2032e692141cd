//! Error types used to report failure in low-level parsing
//!
//! This module contains the error cases that may arise as a result of calls
//! to [`Parser`](crate::parse::Parser) methods, and of [`Decode`] implementations
//! built on top of them.
//!
//! Every variant of [`ParseError`] is terminal for the decode attempt that
//! produced it: the cursor of the parser is left at an unspecified position and
//! no attempt should be made to resume reading from it.
//!
//! [`Decode`]: crate::conv::Decode

use std::error::Error;
use std::fmt::{Display, Formatter, Result};

use crate::error::LengthError;

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types, or when decoding values from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A read required more bytes than remain in the buffer.
    BufferUnderrun {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// A varint failed to terminate within ten 7-bit groups, or its tenth
    /// group carried bits above bit 63. Holds the bytes consumed.
    MalformedVarint(Vec<u8>),
    /// A length-prefixed string or blob declared more bytes than the
    /// configured read limit of the buffer allows.
    LengthLimitExceeded(LengthError),
    /// An object slot carried a type tag that no decoder is known for.
    UnknownTypeTag(TagError),
    /// A varint was well-formed but its value does not fit the integer type
    /// being decoded.
    OutOfRange { for_type: &'static str, value: i128 },
    /// Objects, lists or boxes were nested more deeply than the depth limit
    /// of the parser allows.
    DepthLimitExceeded { offset: usize, limit: usize },
}

impl ParseError {
    /// Constructs a `BufferUnderrun` for a failed request of `requested` bytes
    pub(crate) fn underrun(offset: usize, requested: usize, available: usize) -> Self {
        Self::BufferUnderrun {
            offset,
            requested,
            available,
        }
    }

    /// Constructs an `OutOfRange` error naming the integer type `T`
    pub(crate) fn out_of_range<T>(value: impl Into<i128>) -> Self {
        Self::OutOfRange {
            for_type: std::any::type_name::<T>(),
            value: value.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::BufferUnderrun {
                offset,
                requested,
                available,
            } => {
                write!(
                    f,
                    "cannot consume {} bytes at offset {} ({} bytes remaining)",
                    requested, offset, available
                )
            }
            ParseError::MalformedVarint(bytes) => {
                write!(f, "malformed varint:")?;
                for byte in bytes {
                    write!(f, " {:02x}", byte)?;
                }
                Ok(())
            }
            ParseError::LengthLimitExceeded(err) => {
                write!(f, "read limit exceeded: {}", err)
            }
            ParseError::UnknownTypeTag(err) => Display::fmt(err, f),
            ParseError::OutOfRange { for_type, value } => {
                write!(f, "decoded value {} does not fit in {}", value, for_type)
            }
            ParseError::DepthLimitExceeded { offset, limit } => {
                write!(f, "nesting depth limit {} exceeded at offset {}", limit, offset)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::LengthLimitExceeded(err) => Some(err),
            ParseError::UnknownTypeTag(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LengthError> for ParseError {
    fn from(err: LengthError) -> Self {
        Self::LengthLimitExceeded(err)
    }
}

impl From<TagError> for ParseError {
    fn from(err: TagError) -> Self {
        Self::UnknownTypeTag(err)
    }
}

/// Type alias for Result with an error type of [`ParseError`]
///
/// Most `Parser` methods, and every `Decode::parse` implementation, have a
/// return type of `ParseResult<T>` for various `T`
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Converts a borrowed byte-slice into an owned byte-array
///
/// Callers only invoke this on slices returned by a successful
/// `consume(N)`, so a length mismatch indicates a broken `Parser`
/// implementation and is reported as an underrun at offset zero.
pub(crate) fn coerce_slice<const N: usize>(bytes: &'_ [u8]) -> ParseResult<[u8; N]> {
    <[u8; N] as std::convert::TryFrom<&'_ [u8]>>::try_from(bytes)
        .map_err(|_| ParseError::underrun(0, N, bytes.len()))
}

/// Error representing an object type-tag with no known decoder
///
/// `for_type` names the slot being decoded (the concrete message type for
/// a typed slot, or the polymorphic slot type), and `expected` lists the tags
/// that would have been accepted, when that set is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    actual: u8,
    for_type: &'static str,
    expected: Option<Vec<u8>>,
}

impl TagError {
    /// Constructs a `TagError` value with the provided slot name `for_type` and
    /// set of valid values `expected`
    pub fn new(actual: u8, for_type: &'static str, expected: Option<Vec<u8>>) -> Self {
        Self {
            actual,
            for_type,
            expected,
        }
    }

    /// Constructs a `TagError` from the invalid tag value and a list of valid tag-values,
    /// using an inferred type-name via [`std::any::type_name`]
    pub fn with_type<U: ?Sized>(actual: u8, expected: Option<Vec<u8>>) -> Self {
        Self {
            actual,
            for_type: std::any::type_name::<U>(),
            expected,
        }
    }

    /// The tag byte that was read
    pub fn actual(&self) -> u8 {
        self.actual
    }

    /// The tags that would have been accepted, if known
    pub fn expected(&self) -> Option<&[u8]> {
        self.expected.as_deref()
    }
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "unknown type tag {:#04x} for object slot {}",
            self.actual, self.for_type
        )?;
        match &self.expected {
            Some(tags) if !tags.is_empty() => write!(f, " (expected one of {:?})", tags),
            Some(_) => write!(f, " (no decoders registered)"),
            None => Ok(()),
        }
    }
}

impl Error for TagError {}
