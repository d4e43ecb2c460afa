use ctype_utils::num::align_up;

use crate::info::{CompositeKind, DefinitionError, Field, Type, TypeKind};

impl Type {
    /// Size in bytes, following the C ABI of the current target.
    ///
    /// Structs include trailing padding up to their alignment, so arrays of
    /// structs have the same stride as in C. Unions take their largest arm.
    /// Forward references have size 0. A hand-built type too large for the
    /// address space reports `usize::MAX`; parsed and constructed composites
    /// never do.
    pub fn size(&self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    pub(crate) fn checked_size(&self) -> Option<usize> {
        match self.kind() {
            TypeKind::Primitive(p) => Some(p.size()),
            TypeKind::Pointer(_) => Some(size_of::<*const u8>()),
            TypeKind::Array(array) => array.len().checked_mul(array.item().checked_size()?),
            TypeKind::Struct(info) => {
                let end = match info.fields().last() {
                    Some(f) => f.offset().checked_add(f.ty().checked_size()?)?,
                    None => 0,
                };
                align_up(end, self.align())
            }
            TypeKind::Union(info) => {
                let mut widest = 0;
                for field in info.iter() {
                    widest = widest.max(field.ty().checked_size()?);
                }
                align_up(widest, self.align())
            }
        }
    }

    /// Natural alignment in bytes.
    pub fn align(&self) -> usize {
        match self.kind() {
            TypeKind::Primitive(p) => p.align(),
            TypeKind::Pointer(_) => align_of::<*const u8>(),
            TypeKind::Array(array) => array.item().align(),
            TypeKind::Struct(info) | TypeKind::Union(info) => {
                info.iter().map(|f| f.ty().align()).max().unwrap_or(1)
            }
        }
    }
}

/// Assigns offsets to freshly declared fields.
///
/// Struct members are placed one after another, each aligned up to its own
/// alignment. Union members all sit at offset 0. Fails when the composite,
/// padding included, does not fit in `usize`.
pub(crate) fn layout_fields(
    kind: CompositeKind,
    name: &str,
    fields: &mut [Field],
) -> Result<(), DefinitionError> {
    let too_large = || DefinitionError::TooLarge { name: name.into() };
    let align = fields.iter().map(|f| f.ty().align()).max().unwrap_or(1);

    let mut end: usize = 0;
    for field in fields {
        let size = field.ty().checked_size().ok_or_else(too_large)?;
        match kind {
            CompositeKind::Struct => {
                let offset = align_up(end, field.ty().align()).ok_or_else(too_large)?;
                field.set_offset(offset);
                end = offset.checked_add(size).ok_or_else(too_large)?;
            }
            CompositeKind::Union => {
                field.set_offset(0);
                end = end.max(size);
            }
        }
    }
    align_up(end, align).map(drop).ok_or_else(too_large)
}

#[cfg(test)]
mod tests {
    use core::ffi::{c_char, c_int, c_long, c_short};

    use crate::encoding::ParseError;
    use crate::info::{DefinitionError, Field, Primitive, Type};

    #[repr(C)]
    struct Padded {
        a: c_char,
        b: c_int,
        c: c_short,
    }

    #[repr(C)]
    union Number {
        i: c_int,
        l: c_long,
        bytes: [c_char; 3],
    }

    #[test]
    fn struct_matches_repr_c() {
        let ty = Type::from_encoding("{LayoutPadded=c{$a$1=}i{$b$2=}s{$c$3=}}").unwrap();
        assert_eq!(ty.size(), size_of::<Padded>());
        assert_eq!(ty.align(), align_of::<Padded>());
        assert_eq!(ty.field("a").unwrap().offset(), 0);
        assert_eq!(ty.field("b").unwrap().offset(), 4);
        assert_eq!(ty.field("c").unwrap().offset(), 8);
    }

    #[test]
    fn union_takes_widest_arm() {
        let ty = Type::from_encoding("(LayoutNumber=i{$i$1=}l{$l$2=}[3c]{$bytes$3=})").unwrap();
        assert_eq!(ty.size(), size_of::<Number>());
        assert_eq!(ty.align(), align_of::<Number>());
        assert!(ty.as_union().unwrap().iter().all(|f| f.offset() == 0));
    }

    #[test]
    fn array_and_pointer() {
        let arr = Type::array(4, Type::primitive(Primitive::Short));
        assert_eq!(arr.size(), 4 * size_of::<c_short>());
        assert_eq!(arr.align(), align_of::<c_short>());

        let ptr = Type::pointer(Type::primitive(Primitive::Void));
        assert_eq!(ptr.size(), size_of::<usize>());
    }

    #[test]
    fn oversized_composites_are_rejected() {
        let half = usize::MAX / 2 + 1;
        let encoding = format!("{{LayoutHuge=[{half}c]{{$a$1=}}[{half}c]{{$b$2=}}}}");
        let err = Type::from_encoding(&encoding).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Definition(DefinitionError::TooLarge { ref name }) if &**name == "LayoutHuge"
        ));

        let err = Type::structure(
            "LayoutPadOverflow",
            vec![
                Field::named("bytes", Type::array(usize::MAX - 2, Type::primitive(Primitive::SChar))),
                Field::named("i", Type::primitive(Primitive::Int)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::TooLarge { .. }));
    }

    #[test]
    fn oversized_arrays_are_rejected() {
        let err = Type::from_encoding("{LayoutWide=[18446744073709551615i]{$a$1=}i{$b$2=}}")
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidArrayLength { .. } | ParseError::Definition(_)
        ));
        assert!(Type::from_encoding("[18446744073709551615i]").is_err());
    }

    #[test]
    fn forward_reference_is_empty() {
        let fwd = Type::forward_struct("LayoutNeverDefined");
        assert_eq!(fwd.size(), 0);
        assert_eq!(fwd.align(), 1);
    }
}
