use alloc::boxed::Box;

use ctype_utils::num::parse_c_integer;
use thiserror::Error;

use crate::info::{CompositeInfo, Field, Primitive, TypeKind};

/// A field annotation that refers to a sibling which cannot play its role.
///
/// Returned when a composite is parsed or constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnnotationError {
    #[error("field `{field}` is sized by `{length_field}`, which is not a sibling field")]
    MissingLengthField {
        field: Box<str>,
        length_field: Box<str>,
    },
    #[error("field `{field}` is sized by `{length_field}`, which is not an integer")]
    LengthFieldNotInteger {
        field: Box<str>,
        length_field: Box<str>,
    },
    #[error("field `{field}` is tagged but is not a union")]
    TaggedNonUnion { field: Box<str> },
    #[error("field `{field}` is tagged by `{tag_field}`, which is not a sibling field")]
    MissingTagField { field: Box<str>, tag_field: Box<str> },
    #[error("field `{field}` is tagged by `{tag_field}`, which is neither an integer nor a string")]
    InvalidTagField { field: Box<str>, tag_field: Box<str> },
    #[error("arm `{arm}` of `{field}` has no tag value for an integer tag")]
    UntaggedArm { field: Box<str>, arm: Box<str> },
    #[error("arm `{arm}` of `{field}` has tag value `{value}`, which is not an integer")]
    InvalidTagValue {
        field: Box<str>,
        arm: Box<str>,
        value: Box<str>,
    },
}

/// Failure to define a struct or union.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error("`{name}` is larger than the address space")]
    TooLarge { name: Box<str> },
}

fn display_name(field: &Field) -> Box<str> {
    field.name().unwrap_or("<anonymous>").into()
}

/// Checks `sized_by` and `tagged_by` annotations against the siblings they name.
pub(crate) fn validate_composite(info: &CompositeInfo) -> Result<(), AnnotationError> {
    for field in info.iter() {
        if let Some(length_field) = field.length_field() {
            validate_length(info, field, length_field)?;
        }
        if let Some(tag_field) = field.tagged_by() {
            validate_tag(info, field, tag_field)?;
        }
    }
    Ok(())
}

fn validate_length(
    info: &CompositeInfo,
    field: &Field,
    length_field: &str,
) -> Result<(), AnnotationError> {
    let Some(sibling) = info.field(length_field) else {
        return Err(AnnotationError::MissingLengthField {
            field: display_name(field),
            length_field: length_field.into(),
        });
    };
    match sibling.ty().as_primitive() {
        Some(p) if p.is_integer() => Ok(()),
        _ => Err(AnnotationError::LengthFieldNotInteger {
            field: display_name(field),
            length_field: length_field.into(),
        }),
    }
}

fn validate_tag(info: &CompositeInfo, field: &Field, tag_field: &str) -> Result<(), AnnotationError> {
    let TypeKind::Union(arms) = field.ty().kind() else {
        return Err(AnnotationError::TaggedNonUnion {
            field: display_name(field),
        });
    };
    let Some(sibling) = info.field(tag_field) else {
        return Err(AnnotationError::MissingTagField {
            field: display_name(field),
            tag_field: tag_field.into(),
        });
    };

    match sibling.ty().as_primitive() {
        // Arms match by tag value or by their own name.
        Some(Primitive::CString) => Ok(()),
        Some(p) if p.is_integer() || p == Primitive::Bool => {
            for arm in arms.iter() {
                let Some(value) = arm.tag_value() else {
                    return Err(AnnotationError::UntaggedArm {
                        field: display_name(field),
                        arm: display_name(arm),
                    });
                };
                if parse_c_integer(value).is_none() {
                    return Err(AnnotationError::InvalidTagValue {
                        field: display_name(field),
                        arm: display_name(arm),
                        value: value.into(),
                    });
                }
            }
            Ok(())
        }
        _ => Err(AnnotationError::InvalidTagField {
            field: display_name(field),
            tag_field: tag_field.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Type;

    #[test]
    fn sized_by_requires_integer_sibling() {
        let err = Type::from_encoding("{ValNums=d{$len$1=}^i{$nums$2$sized_by_len=}}").unwrap_err();
        assert!(err.to_string().contains("not an integer"));

        let err = Type::from_encoding("{ValNums2=^i{$nums$2$sized_by_count=}}").unwrap_err();
        assert!(err.to_string().contains("not a sibling"));

        assert!(Type::from_encoding("{ValNums3=I{$len$1=}^i{$nums$2$sized_by_len=}}").is_ok());
    }

    #[test]
    fn tagged_by_rules() {
        let err = Type::from_encoding("{ValTag1=i{$tag$1=}i{$value$2$tagged_by_tag=}}").unwrap_err();
        assert!(matches!(
            err,
            crate::encoding::ParseError::Definition(DefinitionError::Annotation(
                AnnotationError::TaggedNonUnion { .. }
            ))
        ));

        let err = Type::from_encoding(
            "{ValTag2=i{$tag$1=}(ValTag2U=i{$i$1=}f{$f$2$tag_value_1=}){$value$3$tagged_by_tag=}}",
        )
        .unwrap_err();
        assert!(err.to_string().contains("no tag value"));

        // String tags may fall back to arm names.
        assert!(
            Type::from_encoding(
                "{ValTag3=*{$kind$1=}(ValTag3U=i{$i$1=}f{$f$2=}){$value$3$tagged_by_kind=}}"
            )
            .is_ok()
        );
    }
}
