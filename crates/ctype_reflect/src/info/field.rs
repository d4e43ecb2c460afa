use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::info::{Modifier, Type};

/// A member of a struct or an arm of a union.
///
/// Fields own their [`Type`]. The name is absent for members whose encoding
/// carried no field tag; such fields take part in layout but are invisible
/// to lookups and to the JSON codec.
#[derive(Debug, Clone)]
pub struct Field {
    ty: Type,
    name: Option<Box<str>>,
    offset: usize,
    length_field_name: Option<Box<str>>,
    modifiers: Vec<Modifier>,
}

impl Field {
    /// Creates an anonymous field.
    ///
    /// The offset is assigned when the field is placed into a composite.
    pub fn anonymous(ty: Type) -> Self {
        Self {
            ty,
            name: None,
            offset: 0,
            length_field_name: None,
            modifiers: Vec::new(),
        }
    }

    /// Creates a named field.
    pub fn named(name: impl Into<Box<str>>, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::anonymous(ty)
        }
    }

    /// Appends an annotation.
    ///
    /// A [`Modifier::SizedBy`] also records the length field name.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.push_modifier(modifier);
        self
    }

    /// Appends annotations parsed from their text form.
    ///
    /// ```
    /// use ctype_reflect::info::{Field, Primitive, Type};
    ///
    /// let nums = Field::named("nums", Type::pointer(Type::primitive(Primitive::Int)))
    ///     .with_modifiers(["sized_by_len", "optional"]);
    ///
    /// assert_eq!(nums.length_field_name(), Some("len"));
    /// assert!(nums.is_optional());
    /// ```
    pub fn with_modifiers<'s>(mut self, texts: impl IntoIterator<Item = &'s str>) -> Self {
        for text in texts {
            self.push_modifier(Modifier::parse(text));
        }
        self
    }

    pub(crate) fn push_modifier(&mut self, modifier: Modifier) {
        // The token after a legacy `sizedby` is a field name, whatever it reads as.
        if self.length_field_name.is_none() && self.modifiers.last() == Some(&Modifier::LegacySizedBy)
        {
            let name: Box<str> = modifier.text().into();
            self.length_field_name = Some(name.clone());
            self.modifiers.push(Modifier::Other(name));
            return;
        }
        if let Modifier::SizedBy(name) = &modifier {
            self.length_field_name = Some(name.clone());
        }
        self.modifiers.push(modifier);
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// The type of this field.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The declared name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Byte offset inside the enclosing composite. Always 0 in a union.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The sibling named by a `sized_by_<NAME>` annotation.
    #[inline]
    pub fn length_field_name(&self) -> Option<&str> {
        self.length_field_name.as_deref()
    }

    /// Annotations in declaration order.
    #[inline]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Returns `true` if one of the annotations has exactly this text.
    ///
    /// ```
    /// use ctype_reflect::info::{Field, Primitive, Type};
    ///
    /// let f = Field::named("n", Type::primitive(Primitive::Int)).with_modifiers(["no_serialise"]);
    /// assert!(f.has_modifier("no_serialise"));
    /// assert!(!f.has_modifier("no_serial"));
    /// ```
    pub fn has_modifier(&self, text: &str) -> bool {
        self.modifiers.iter().any(|m| m.text() == text)
    }

    /// The JSON object key: a `serialise_as_<KEY>` override, else the name.
    pub fn json_key(&self) -> Option<&str> {
        self.modifiers
            .iter()
            .find_map(|m| match m {
                Modifier::SerialiseAs(key) => Some(&**key),
                _ => None,
            })
            .or(self.name())
    }

    /// The sibling holding this field's element count.
    ///
    /// Covers both `sized_by_<NAME>` and the legacy `sizedby` form, where the
    /// name is the annotation that follows.
    #[inline]
    pub fn length_field(&self) -> Option<&str> {
        self.length_field_name()
    }

    /// The sibling selecting the active arm, for a tagged union field.
    pub fn tagged_by(&self) -> Option<&str> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::TaggedBy(name) => Some(&**name),
            _ => None,
        })
    }

    /// The discriminator text selecting this union arm.
    pub fn tag_value(&self) -> Option<&str> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::TagValue(value) => Some(&**value),
            _ => None,
        })
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.modifiers.contains(&Modifier::Optional)
    }

    #[inline]
    pub fn skips_serialise(&self) -> bool {
        self.modifiers.contains(&Modifier::NoSerialise)
    }

    #[inline]
    pub fn skips_deserialise(&self) -> bool {
        self.modifiers.contains(&Modifier::NoDeserialise)
    }
}
