use thiserror::Error;

use crate::info::DefinitionError;

/// Failure to read a type encoding.
///
/// Offsets are byte positions into the encoding where the problem was found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("encoding ends unexpectedly at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("expected `{expected}` at offset {offset}, found `{found}`")]
    MissingLiteral {
        expected: char,
        found: char,
        offset: usize,
    },
    #[error("field at offset {offset} consumed no input")]
    NoProgress { offset: usize },
    #[error("unknown type encoding `{byte}` at offset {offset}")]
    UnknownEncoding { byte: char, offset: usize },
    #[error("array at offset {offset} has no valid length")]
    InvalidArrayLength { offset: usize },
    #[error("field at offset {offset} has type void")]
    VoidField { offset: usize },
    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl ParseError {
    /// The offset the error refers to, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEnd { offset }
            | Self::MissingLiteral { offset, .. }
            | Self::NoProgress { offset }
            | Self::UnknownEncoding { offset, .. }
            | Self::InvalidArrayLength { offset }
            | Self::VoidField { offset }
            | Self::TrailingInput { offset } => Some(*offset),
            Self::Definition(_) => None,
        }
    }
}
