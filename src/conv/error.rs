use crate::parse::error::ParseError;

/// Error returned by the whole-input decoding methods of [`Decode`](super::Decode)
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The value itself could not be parsed
    Parse(ParseError),
    /// The value parsed, but bytes were left over (only with `check_complete_parse`)
    NonEmpty { residual: usize },
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Parse(err) => {
                write!(f, "parser encountered error: {}", err)
            }
            DecodeError::NonEmpty { residual } => {
                write!(f, "{} bytes left over after decoding", residual)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Parse(err) => Some(err),
            DecodeError::NonEmpty { .. } => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
