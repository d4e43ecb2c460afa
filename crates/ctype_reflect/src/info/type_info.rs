use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::info::hash::hash_type;
use crate::info::validate::validate_composite;
use crate::info::{CompositeInfo, CompositeKind, DefinitionError, Field, Primitive};
use crate::info::{TypeModifiers, layout_fields};

// -----------------------------------------------------------------------------
// ArrayInfo

/// A fixed-length array: `[N T]` in an encoding.
#[derive(Debug, Clone)]
pub struct ArrayInfo {
    len: usize,
    item: Box<Type>,
}

impl ArrayInfo {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Element type.
    #[inline]
    pub fn item(&self) -> &Type {
        &self.item
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// The five shapes a [`Type`] can take.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(Primitive),
    Pointer(Box<Type>),
    Array(ArrayInfo),
    Struct(CompositeInfo),
    Union(CompositeInfo),
}

// -----------------------------------------------------------------------------
// Type

/// A runtime description of a C-like type.
///
/// Owns its whole tree. The [`hash`](Type::hash) is computed on construction
/// and recomputed whenever the modifiers change, so two types with the same
/// structure always compare equal by hash.
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::{Primitive, Type, TypeModifiers};
///
/// let ty = Type::from_encoding("r^i").unwrap();
/// let pointee = ty.as_pointee().unwrap();
///
/// assert_eq!(pointee.as_primitive(), Some(Primitive::Int));
/// assert!(pointee.modifiers().contains(TypeModifiers::CONST));
/// assert_eq!(ty.hash(), Type::from_encoding("^ri").unwrap().hash());
/// ```
#[derive(Debug, Clone)]
pub struct Type {
    kind: TypeKind,
    modifiers: TypeModifiers,
    hash: u64,
}

impl Type {
    /// Creates a type and computes its hash.
    pub fn new(kind: TypeKind, modifiers: TypeModifiers) -> Self {
        let hash = hash_type(&kind, modifiers);
        Self {
            kind,
            modifiers,
            hash,
        }
    }

    #[inline]
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(TypeKind::Primitive(primitive), TypeModifiers::empty())
    }

    #[inline]
    pub fn pointer(pointee: Type) -> Self {
        Self::new(TypeKind::Pointer(Box::new(pointee)), TypeModifiers::empty())
    }

    #[inline]
    pub fn array(len: usize, item: Type) -> Self {
        let info = ArrayInfo {
            len,
            item: Box::new(item),
        };
        Self::new(TypeKind::Array(info), TypeModifiers::empty())
    }

    /// Builds a struct, laying out the fields and checking their annotations.
    pub fn structure(name: &str, fields: Vec<Field>) -> Result<Self, DefinitionError> {
        Self::composite(CompositeKind::Struct, name, fields, TypeModifiers::empty())
    }

    /// Builds a union, placing every arm at offset 0 and checking annotations.
    pub fn union(name: &str, fields: Vec<Field>) -> Result<Self, DefinitionError> {
        Self::composite(CompositeKind::Union, name, fields, TypeModifiers::empty())
    }

    /// A body-less struct, to be resolved through the definition cache.
    #[inline]
    pub fn forward_struct(name: &str) -> Self {
        Self::new(
            TypeKind::Struct(CompositeInfo::new(name, Vec::new())),
            TypeModifiers::empty(),
        )
    }

    /// A body-less union, to be resolved through the definition cache.
    #[inline]
    pub fn forward_union(name: &str) -> Self {
        Self::new(
            TypeKind::Union(CompositeInfo::new(name, Vec::new())),
            TypeModifiers::empty(),
        )
    }

    pub(crate) fn composite(
        kind: CompositeKind,
        name: &str,
        mut fields: Vec<Field>,
        modifiers: TypeModifiers,
    ) -> Result<Self, DefinitionError> {
        layout_fields(kind, name, &mut fields)?;
        let info = CompositeInfo::new(name, fields);
        validate_composite(&info)?;
        let kind = match kind {
            CompositeKind::Struct => TypeKind::Struct(info),
            CompositeKind::Union => TypeKind::Union(info),
        };
        Ok(Self::new(kind, modifiers))
    }

    /// Returns the type with `modifiers` added.
    pub fn with_modifiers(mut self, modifiers: TypeModifiers) -> Self {
        self.add_modifiers(modifiers);
        self
    }

    pub(crate) fn add_modifiers(&mut self, modifiers: TypeModifiers) {
        self.modifiers |= modifiers;
        self.rehash();
    }

    pub(crate) fn clear_modifiers(&mut self) {
        self.modifiers = TypeModifiers::empty();
        self.rehash();
    }

    #[inline]
    fn rehash(&mut self) {
        self.hash = hash_type(&self.kind, self.modifiers);
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub fn modifiers(&self) -> TypeModifiers {
        self.modifiers
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.modifiers.contains(TypeModifiers::CONST)
    }

    /// The structural hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// A short name for diagnostics: the C spelling of a primitive, the
    /// composite name, or `array` / `pointer`.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(p) => p.type_name(),
            TypeKind::Pointer(_) => "pointer",
            TypeKind::Array(_) => "array",
            TypeKind::Struct(info) | TypeKind::Union(info) => info.name(),
        }
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match &self.kind {
            TypeKind::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    #[inline]
    pub fn as_pointee(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&ArrayInfo> {
        match &self.kind {
            TypeKind::Array(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_struct(&self) -> Option<&CompositeInfo> {
        match &self.kind {
            TypeKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_union(&self) -> Option<&CompositeInfo> {
        match &self.kind {
            TypeKind::Union(info) => Some(info),
            _ => None,
        }
    }

    /// Either composite kind, with its discriminant.
    #[inline]
    pub fn as_composite(&self) -> Option<(CompositeKind, &CompositeInfo)> {
        match &self.kind {
            TypeKind::Struct(info) => Some((CompositeKind::Struct, info)),
            TypeKind::Union(info) => Some((CompositeKind::Union, info)),
            _ => None,
        }
    }

    /// Returns `true` for `char *` and for pointers, the two shapes a
    /// length annotation applies to.
    #[inline]
    pub fn is_sizable(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Pointer(_) | TypeKind::Primitive(Primitive::CString)
        )
    }

    /// Looks up a named field of a struct or union.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.as_composite().and_then(|(_, info)| info.field(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_match_parser() {
        let built = Type::structure(
            "TypeInfoPair",
            vec![
                Field::named("a", Type::primitive(Primitive::Int)),
                Field::named("b", Type::pointer(Type::primitive(Primitive::Double))),
            ],
        )
        .unwrap();
        let parsed = Type::from_encoding("{TypeInfoPair=i{$a$1=}^d{$b$2=}}").unwrap();

        assert_eq!(built.hash(), parsed.hash());
        assert_eq!(built.size(), parsed.size());
        assert_eq!(built.field("b").unwrap().offset(), size_of::<usize>());
    }

    #[test]
    fn modifiers_rehash() {
        let mut ty = Type::primitive(Primitive::Float);
        let before = ty.hash();
        ty.add_modifiers(TypeModifiers::CONST);
        assert!(ty.is_const());
        assert_eq!(ty.hash(), before + 1);
        ty.clear_modifiers();
        assert_eq!(ty.hash(), before);
    }

    #[test]
    fn names_for_diagnostics() {
        assert_eq!(Type::primitive(Primitive::UChar).type_name(), "unsigned char");
        assert_eq!(Type::array(2, Type::primitive(Primitive::Int)).type_name(), "array");
        assert_eq!(Type::pointer(Type::primitive(Primitive::Int)).type_name(), "pointer");
        assert_eq!(Type::forward_union("Opaque").type_name(), "Opaque");
    }

    #[test]
    fn casts() {
        let ty = Type::from_encoding("[2^C]").unwrap();
        let array = ty.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert!(array.item().is_sizable());
        assert!(ty.as_struct().is_none());
        assert!(Type::primitive(Primitive::CString).is_sizable());
    }
}
