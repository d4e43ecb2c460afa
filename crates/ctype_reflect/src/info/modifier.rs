use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::fmt;

use bitflags::bitflags;

// -----------------------------------------------------------------------------
// TypeModifiers

bitflags! {
    /// Qualifiers carried by a [`Type`](crate::info::Type).
    ///
    /// The raw bits take part in the type hash.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeModifiers: u32 {
        /// `const`, encoded as a leading `r`.
        const CONST = 1;
    }
}

// -----------------------------------------------------------------------------
// Modifier

/// A single field annotation taken from a field tag.
///
/// Annotations are kept in declaration order. Unrecognized text is preserved
/// in [`Modifier::Other`], which is also where the name following a legacy
/// `sizedby` token ends up.
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::Modifier;
///
/// let m = Modifier::parse("sized_by_len");
/// assert_eq!(m, Modifier::SizedBy("len".into()));
/// assert_eq!(m.to_string(), "sized_by_len");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `optional`: may be absent from input JSON.
    Optional,
    /// `no_serialise`: omitted from JSON output.
    NoSerialise,
    /// `no_deserialise`: ignored on JSON input.
    NoDeserialise,
    /// `serialise_as_<KEY>`: JSON key override.
    SerialiseAs(Box<str>),
    /// `sized_by_<NAME>`: element count lives in sibling `<NAME>`.
    SizedBy(Box<str>),
    /// `sizedby`: legacy form, the next modifier names the sibling.
    LegacySizedBy,
    /// `tagged_by_<NAME>`: union arm chosen by sibling `<NAME>`.
    TaggedBy(Box<str>),
    /// `tag_value_<VAL>`: discriminator value selecting this union arm.
    TagValue(Box<str>),
    /// Anything else.
    Other(Box<str>),
}

impl Modifier {
    const SERIALISE_AS: &'static str = "serialise_as_";
    const SIZED_BY: &'static str = "sized_by_";
    const TAGGED_BY: &'static str = "tagged_by_";
    const TAG_VALUE: &'static str = "tag_value_";

    /// Classifies the text of one annotation.
    pub fn parse(text: &str) -> Self {
        match text {
            "optional" => return Self::Optional,
            "no_serialise" => return Self::NoSerialise,
            "no_deserialise" => return Self::NoDeserialise,
            "sizedby" => return Self::LegacySizedBy,
            _ => {}
        }

        if let Some(key) = text.strip_prefix(Self::SERIALISE_AS) {
            Self::SerialiseAs(key.into())
        } else if let Some(name) = text.strip_prefix(Self::SIZED_BY) {
            Self::SizedBy(name.into())
        } else if let Some(name) = text.strip_prefix(Self::TAGGED_BY) {
            Self::TaggedBy(name.into())
        } else if let Some(value) = text.strip_prefix(Self::TAG_VALUE) {
            Self::TagValue(value.into())
        } else {
            Self::Other(text.into())
        }
    }

    /// The annotation text as it appears in an encoding.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Optional => Cow::Borrowed("optional"),
            Self::NoSerialise => Cow::Borrowed("no_serialise"),
            Self::NoDeserialise => Cow::Borrowed("no_deserialise"),
            Self::LegacySizedBy => Cow::Borrowed("sizedby"),
            Self::SerialiseAs(key) => Cow::Owned(format!("{}{key}", Self::SERIALISE_AS)),
            Self::SizedBy(name) => Cow::Owned(format!("{}{name}", Self::SIZED_BY)),
            Self::TaggedBy(name) => Cow::Owned(format!("{}{name}", Self::TAGGED_BY)),
            Self::TagValue(value) => Cow::Owned(format!("{}{value}", Self::TAG_VALUE)),
            Self::Other(text) => Cow::Borrowed(text),
        }
    }
}

impl fmt::Display for Modifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vocabulary() {
        assert_eq!(Modifier::parse("optional"), Modifier::Optional);
        assert_eq!(Modifier::parse("no_serialise"), Modifier::NoSerialise);
        assert_eq!(Modifier::parse("no_deserialise"), Modifier::NoDeserialise);
        assert_eq!(Modifier::parse("sizedby"), Modifier::LegacySizedBy);
        assert_eq!(
            Modifier::parse("serialise_as_MyVal"),
            Modifier::SerialiseAs("MyVal".into())
        );
        assert_eq!(
            Modifier::parse("tagged_by_kind"),
            Modifier::TaggedBy("kind".into())
        );
        assert_eq!(
            Modifier::parse("tag_value_0x10"),
            Modifier::TagValue("0x10".into())
        );
        assert_eq!(Modifier::parse("len"), Modifier::Other("len".into()));
    }

    #[test]
    fn text_is_preserved() {
        for text in ["optional", "sizedby", "sized_by_count", "tag_value_", "weird"] {
            assert_eq!(Modifier::parse(text).text(), text);
        }
    }

    #[test]
    fn const_bits() {
        let m = TypeModifiers::CONST;
        assert_eq!(m.bits(), 1);
        assert_eq!(TypeModifiers::default().bits(), 0);
    }
}
