use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use std::io;

use thiserror::Error;

// -----------------------------------------------------------------------------
// JsonErrorKind

/// What went wrong while converting between JSON and typed memory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonErrorKind {
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("type mismatch: {0}")]
    TypeMismatch(Box<str>),
    #[error("array has {found} elements, expected {expected}")]
    ArrayLength { expected: usize, found: usize },
    #[error("{value} does not fit in {target}")]
    OutOfRange { value: Box<str>, target: Box<str> },
    #[error("missing required field `{0}`")]
    MissingField(Box<str>),
    #[error("duplicate field `{0}`")]
    DuplicateField(Box<str>),
    #[error("unknown field `{0}`")]
    UnknownField(Box<str>),
    #[error("field `{field}` has {found} elements but its length field holds {expected}")]
    LengthMismatch {
        field: Box<str>,
        expected: i128,
        found: usize,
    },
    #[error("length field of `{0}` does not hold a valid element count")]
    InvalidLength(Box<str>),
    #[error("union `{0}` has no tag to select an arm")]
    UntaggedUnion(Box<str>),
    #[error("cannot select an arm of `{field}`: {reason}")]
    UnresolvedUnion {
        field: Box<str>,
        reason: &'static str,
    },
    #[error("unsupported: {0}")]
    Unsupported(Box<str>),
    #[error("failed to allocate {0} bytes")]
    Allocation(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl JsonErrorKind {
    /// A distinct negative status for each kind.
    pub fn code(&self) -> i32 {
        match self {
            Self::Malformed(_) => -1,
            Self::TypeMismatch(_) => -2,
            Self::ArrayLength { .. } => -3,
            Self::OutOfRange { .. } => -4,
            Self::MissingField(_) => -5,
            Self::DuplicateField(_) => -6,
            Self::UnknownField(_) => -7,
            Self::LengthMismatch { .. } => -8,
            Self::InvalidLength(_) => -9,
            Self::UntaggedUnion(_) => -10,
            Self::UnresolvedUnion { .. } => -11,
            Self::Unsupported(_) => -12,
            Self::Allocation(_) => -13,
            Self::Io(_) => -14,
        }
    }

    pub(crate) fn mismatch(expected: &str, found: &str) -> Self {
        Self::TypeMismatch(format!("expected {expected}, found {found}").into())
    }

    /// Classifies an error that serde_json raised on its own.
    pub(crate) fn from_json(error: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match error.classify() {
            Category::Io => Self::Io(error.into()),
            Category::Syntax | Category::Eof => Self::Malformed(error),
            Category::Data => Self::TypeMismatch(error.to_string().into()),
        }
    }
}

// -----------------------------------------------------------------------------
// JsonError

/// Failure of [`value_to_json`](crate::serde::value_to_json) or
/// [`json_to_value`](crate::serde::json_to_value).
///
/// With the `debug` feature the error also carries the path of the value
/// being processed, such as `$.items[2].name`.
#[derive(Debug)]
pub struct JsonError {
    kind: JsonErrorKind,
    #[cfg(feature = "debug")]
    path: String,
}

impl JsonError {
    pub(crate) fn new(kind: JsonErrorKind, path: Option<String>) -> Self {
        #[cfg(not(feature = "debug"))]
        let _ = path;
        Self {
            kind,
            #[cfg(feature = "debug")]
            path: path.unwrap_or_else(|| String::from("$")),
        }
    }

    #[inline]
    pub fn kind(&self) -> &JsonErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> JsonErrorKind {
        self.kind
    }

    /// See [`JsonErrorKind::code`].
    #[inline]
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Where the failure happened, such as `$.items[2]`.
    #[cfg(feature = "debug")]
    #[inline]
    pub fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    /// Where the failure happened. Only tracked with the `debug` feature.
    #[cfg(not(feature = "debug"))]
    #[inline]
    pub fn path(&self) -> Option<&str> {
        None
    }
}

impl From<JsonErrorKind> for JsonError {
    fn from(kind: JsonErrorKind) -> Self {
        Self::new(kind, None)
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{} (at `{path}`)", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl core::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_negative_and_distinct() {
        let kinds = [
            JsonErrorKind::mismatch("int", "string"),
            JsonErrorKind::ArrayLength { expected: 3, found: 2 },
            JsonErrorKind::MissingField("x".into()),
            JsonErrorKind::Allocation(8),
        ];
        let codes: Vec<i32> = kinds.iter().map(JsonErrorKind::code).collect();
        assert!(codes.iter().all(|c| *c < 0));
        assert_eq!(codes, [-2, -3, -5, -13]);
    }

    #[test]
    fn classify_serde_json_errors() {
        let syntax = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(JsonErrorKind::from_json(syntax), JsonErrorKind::Malformed(_)));

        let data = serde_json::from_str::<i32>("\"a\"").unwrap_err();
        assert!(matches!(JsonErrorKind::from_json(data), JsonErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn display_mentions_path() {
        let err = JsonError::new(JsonErrorKind::MissingField("x".into()), Some("$.pair".into()));
        #[cfg(feature = "debug")]
        assert_eq!(err.to_string(), "missing required field `x` (at `$.pair`)");
        #[cfg(not(feature = "debug"))]
        assert_eq!(err.to_string(), "missing required field `x`");
    }
}
