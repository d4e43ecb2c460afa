use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::info::Field;

/// Distinguishes the two composite kinds sharing [`CompositeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Struct,
    Union,
}

impl CompositeKind {
    /// The byte opening this composite in an encoding.
    pub const fn open(self) -> u8 {
        match self {
            Self::Struct => b'{',
            Self::Union => b'(',
        }
    }

    /// The byte closing this composite in an encoding.
    pub const fn close(self) -> u8 {
        match self {
            Self::Struct => b'}',
            Self::Union => b')',
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Union => "union",
        })
    }
}

/// Name and members of a struct or union.
///
/// A composite without fields is a forward reference: the encoding named it
/// without a body, and the full definition is expected in the
/// [definition cache](crate::registry::TypeCache).
#[derive(Debug, Clone)]
pub struct CompositeInfo {
    name: Box<str>,
    fields: Box<[Field]>,
}

impl CompositeInfo {
    /// Creates a composite from already laid out fields.
    pub(crate) fn new(name: impl Into<Box<str>>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` for a body-less forward reference.
    #[inline]
    pub fn is_forward(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finds a named field. Anonymous fields never match.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == Some(name))
    }

    /// Finds the index of a named field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == Some(name))
    }

    /// Finds the field accepting the given JSON object key.
    pub fn field_by_key(&self, key: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.json_key() == Some(key))
    }

    /// Iterates over the fields.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Field> {
        self.fields.iter()
    }
}
