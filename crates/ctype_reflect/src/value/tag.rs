//! Selection of the active arm of a tagged union.

use ctype_ptr::Ptr;
use ctype_utils::num::parse_c_integer;

use crate::info::{CompositeInfo, Primitive};
use crate::value::scalar::{read_c_str, read_integer};

/// Why no arm could be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagError {
    /// The tag sibling does not exist.
    MissingTagField,
    /// The tag sibling is neither an integer nor a string.
    UnsupportedTag,
    /// The tag string is null.
    NullTag,
    /// No arm carries the tag's value.
    NoMatch,
    /// More than one arm carries the tag's value.
    Ambiguous,
}

impl TagError {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::MissingTagField => "the tag field does not exist",
            Self::UnsupportedTag => "the tag field is neither an integer nor a string",
            Self::NullTag => "the tag string is null",
            Self::NoMatch => "no arm matches the tag value",
            Self::Ambiguous => "several arms match the tag value",
        }
    }
}

/// Finds the arm selected by the current value of the tag sibling.
///
/// `owner` is the struct containing both the union field and the tag field
/// named `tag_field`, and `base` points at that struct. For a string tag, an
/// arm matches on its `tag_value_` text, or on its JSON key when it has none.
/// For an integer tag, an arm matches when its `tag_value_` text, read with C
/// base prefixes, equals the tag.
///
/// # Safety
/// `base` must point to readable memory laid out as `owner`, with the tag
/// field initialized.
pub(crate) unsafe fn select_arm(
    owner: &CompositeInfo,
    tag_field: &str,
    arms: &CompositeInfo,
    base: Ptr<'_>,
) -> Result<usize, TagError> {
    let tag = owner.field(tag_field).ok_or(TagError::MissingTagField)?;
    let primitive = tag.ty().as_primitive().ok_or(TagError::UnsupportedTag)?;
    // SAFETY: Field offsets lie within the struct.
    let slot = unsafe { base.byte_add(tag.offset()) };

    let mut found = None;

    if primitive == Primitive::CString {
        // SAFETY: The tag field is an initialized `char *`.
        let text = unsafe { read_c_str(slot) }.ok_or(TagError::NullTag)?;
        let text = text.to_bytes();
        for (index, arm) in arms.iter().enumerate() {
            let candidate = arm.tag_value().or(arm.json_key());
            if candidate.is_some_and(|c| c.as_bytes() == text) {
                if found.is_some() {
                    return Err(TagError::Ambiguous);
                }
                found = Some(index);
            }
        }
    } else {
        // SAFETY: The tag field is an initialized primitive.
        let value = unsafe { read_integer(slot, primitive) }.ok_or(TagError::UnsupportedTag)?;
        for (index, arm) in arms.iter().enumerate() {
            if arm.tag_value().and_then(parse_c_integer) == Some(value) {
                if found.is_some() {
                    return Err(TagError::Ambiguous);
                }
                found = Some(index);
            }
        }
    }

    found.ok_or(TagError::NoMatch)
}
