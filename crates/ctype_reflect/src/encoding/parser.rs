use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::encoding::ParseError;
use crate::info::{CompositeKind, Field, Modifier, Primitive, Type, TypeKind, TypeModifiers};
use crate::registry::TypeCache;

const CONST: u8 = b'r';
const POINTER: u8 = b'^';
const OPAQUE: u8 = b'?';
const ARRAY_OPEN: u8 = b'[';
const ARRAY_CLOSE: u8 = b']';
const BODY: u8 = b'=';
const TAG_OPEN: u8 = b'{';
const TAG_CLOSE: u8 = b'}';
const TAG_SEP: u8 = b'$';
const LEGACY_OPEN: &[u8] = b"(?=";
const LEGACY_CLOSE: u8 = b')';

// -----------------------------------------------------------------------------
// Parser

/// Recursive-descent reader of type encodings.
///
/// A parser consumes one type at a time from the front of its input and
/// remembers where it stopped, so several concatenated encodings can be read
/// in sequence. Composites read with a body are published to the definition
/// cache; body-less ones are inflated from it when possible.
///
/// # Examples
///
/// ```
/// use ctype_reflect::encoding::Parser;
/// use ctype_reflect::info::Primitive;
///
/// let mut parser = Parser::new("i^d[4C]");
/// assert_eq!(parser.parse_type().unwrap().as_primitive(), Some(Primitive::Int));
/// assert_eq!(parser.remaining(), "^d[4C]");
///
/// parser.parse_type().unwrap();
/// let bytes = parser.parse_type().unwrap();
/// assert_eq!(bytes.size(), 4);
/// assert!(parser.finish().is_ok());
/// ```
pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    cache: &'a TypeCache,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input` using the global definition cache.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            cache: TypeCache::global(),
        }
    }

    /// Uses `cache` instead of the global definition cache.
    pub fn with_cache(mut self, cache: &'a TypeCache) -> Self {
        self.cache = cache;
        self
    }

    /// Byte offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread part of the input.
    #[inline]
    pub fn remaining(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Reads one type.
    ///
    /// On failure the position is left where the error was detected.
    pub fn parse_type(&mut self) -> Result<Type, ParseError> {
        self.parse_qualified(TypeModifiers::empty())
    }

    /// Checks that the whole input has been consumed.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.pos < self.input.len() {
            return Err(ParseError::TrailingInput { offset: self.pos });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cursor

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + ahead).copied()
    }

    #[inline]
    fn unexpected_end(&self) -> ParseError {
        ParseError::UnexpectedEnd { offset: self.pos }
    }

    /// Consumes `byte`, failing if the next byte is something else.
    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        match self.peek() {
            Some(found) if found == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(ParseError::MissingLiteral {
                expected: char::from(byte),
                found: char::from(found),
                offset: self.pos,
            }),
            None => Err(self.unexpected_end()),
        }
    }

    fn eat(&mut self, literal: &[u8]) -> bool {
        let matches = self
            .input
            .as_bytes()
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(literal));
        if matches {
            self.pos += literal.len();
        }
        matches
    }

    /// Consumes bytes up to, not including, the first one in `stops`.
    ///
    /// Fails if the input ends first.
    fn take_until(&mut self, stops: &[u8]) -> Result<&'a str, ParseError> {
        let rest = &self.input.as_bytes()[self.pos..];
        let len = rest
            .iter()
            .position(|b| stops.contains(b))
            .ok_or_else(|| ParseError::UnexpectedEnd {
                offset: self.input.len(),
            })?;
        // Every stop byte is ASCII, so both ends are char boundaries.
        let text = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(text)
    }

    fn take_digits(&mut self) -> &'a str {
        let len = self.input.as_bytes()[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let digits = &self.input[self.pos..self.pos + len];
        self.pos += len;
        digits
    }

    // -------------------------------------------------------------------------
    // Types

    /// Reads a type after folding in its `r` prefixes.
    ///
    /// Compilers disagree on whether `const T *` puts the `r` before the `^`
    /// or before `T`. Qualifiers met before a `^` are carried to the pointee,
    /// so both spellings produce the same tree.
    fn parse_qualified(&mut self, carried: TypeModifiers) -> Result<Type, ParseError> {
        let mut modifiers = carried;
        while self.peek() == Some(CONST) {
            self.pos += 1;
            modifiers |= TypeModifiers::CONST;
        }

        let start = self.pos;
        let byte = self.peek().ok_or_else(|| self.unexpected_end())?;
        match byte {
            POINTER => {
                self.pos += 1;
                if self.peek() == Some(OPAQUE) {
                    self.pos += 1;
                    return Ok(Type::new(
                        TypeKind::Primitive(Primitive::OpaquePointer),
                        modifiers,
                    ));
                }
                let pointee = self.parse_qualified(modifiers)?;
                Ok(Type::pointer(pointee))
            }
            ARRAY_OPEN => {
                self.pos += 1;
                let array = self.parse_array(start)?;
                Ok(array.with_modifiers(modifiers))
            }
            b'{' => self.parse_composite(CompositeKind::Struct, modifiers),
            b'(' => self.parse_composite(CompositeKind::Union, modifiers),
            _ => match Primitive::from_encoding(byte) {
                Some(primitive) => {
                    self.pos += 1;
                    Ok(Type::new(TypeKind::Primitive(primitive), modifiers))
                }
                None => Err(ParseError::UnknownEncoding {
                    byte: char::from(byte),
                    offset: start,
                }),
            },
        }
    }

    fn parse_array(&mut self, start: usize) -> Result<Type, ParseError> {
        let digits = self.take_digits();
        if digits.is_empty() && self.peek().is_none() {
            return Err(self.unexpected_end());
        }
        let len = digits
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidArrayLength { offset: start })?;
        let item = self.parse_type()?;
        self.expect(ARRAY_CLOSE)?;
        if item.checked_size().and_then(|size| size.checked_mul(len)).is_none() {
            return Err(ParseError::InvalidArrayLength { offset: start });
        }
        Ok(Type::array(len, item))
    }

    fn parse_composite(
        &mut self,
        kind: CompositeKind,
        modifiers: TypeModifiers,
    ) -> Result<Type, ParseError> {
        let close = kind.close();
        self.pos += 1;
        let name = self.take_until(&[BODY, close])?;

        let mut fields = Vec::new();
        if self.peek() == Some(BODY) {
            self.pos += 1;
            loop {
                match self.peek() {
                    Some(byte) if byte == close => break,
                    Some(_) => fields.push(self.parse_field()?),
                    None => return Err(self.unexpected_end()),
                }
            }
        }
        self.expect(close)?;

        if fields.is_empty() {
            return Ok(self
                .cache
                .instantiate(kind, name, modifiers)
                .unwrap_or_else(|| placeholder(kind, name, modifiers)));
        }

        let ty = Type::composite(kind, name, fields, modifiers)?;
        self.cache.publish(&ty);
        Ok(ty)
    }

    // -------------------------------------------------------------------------
    // Fields

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let start = self.pos;
        let wrapped = self.eat(LEGACY_OPEN);

        let ty = self.parse_type()?;
        if ty.as_primitive() == Some(Primitive::Void) {
            return Err(ParseError::VoidField { offset: start });
        }

        let field = if self.peek() == Some(TAG_OPEN) && self.peek_at(1) == Some(TAG_SEP) {
            self.parse_field_tag(ty)?
        } else {
            Field::anonymous(ty)
        };

        if wrapped {
            self.expect(LEGACY_CLOSE)?;
        }
        if self.pos == start {
            return Err(ParseError::NoProgress { offset: start });
        }
        Ok(field)
    }

    /// Reads `{$NAME$LINE$mod...=}` following a field type.
    fn parse_field_tag(&mut self, ty: Type) -> Result<Field, ParseError> {
        self.expect(TAG_OPEN)?;
        self.expect(TAG_SEP)?;
        let name: Box<str> = self.take_until(&[TAG_SEP, BODY, TAG_CLOSE])?.into();
        self.expect(TAG_SEP)?;
        // Source line, only there to tell same-named declarations apart.
        self.take_digits();

        let mut field = Field::named(name, ty);
        loop {
            match self.peek() {
                Some(TAG_SEP) => {
                    self.pos += 1;
                    let text = self.take_until(&[TAG_SEP, BODY, TAG_CLOSE])?;
                    if !text.is_empty() {
                        field.push_modifier(Modifier::parse(text));
                    }
                }
                Some(BODY) => {
                    self.pos += 1;
                    self.expect(TAG_CLOSE)?;
                    return Ok(field);
                }
                Some(TAG_CLOSE) => {
                    self.pos += 1;
                    return Ok(field);
                }
                Some(found) => {
                    return Err(ParseError::MissingLiteral {
                        expected: char::from(TAG_CLOSE),
                        found: char::from(found),
                        offset: self.pos,
                    });
                }
                None => return Err(self.unexpected_end()),
            }
        }
    }
}

fn placeholder(kind: CompositeKind, name: &str, modifiers: TypeModifiers) -> Type {
    let ty = match kind {
        CompositeKind::Struct => Type::forward_struct(name),
        CompositeKind::Union => Type::forward_union(name),
    };
    ty.with_modifiers(modifiers)
}

// -----------------------------------------------------------------------------
// Entry points

/// Reads one type from the front of `input` and advances it past the type.
///
/// ```
/// use ctype_reflect::encoding::parse_type;
///
/// let mut cursor = "^ifd";
/// let pointer = parse_type(&mut cursor).unwrap();
/// assert_eq!(pointer.type_name(), "pointer");
/// assert_eq!(cursor, "fd");
/// ```
pub fn parse_type(input: &mut &str) -> Result<Type, ParseError> {
    let mut parser = Parser::new(*input);
    let ty = parser.parse_type()?;
    *input = parser.remaining();
    Ok(ty)
}

impl Type {
    /// Parses a complete encoding, rejecting anything left over.
    pub fn from_encoding(encoding: &str) -> Result<Type, ParseError> {
        let mut parser = Parser::new(encoding);
        let ty = parser.parse_type()?;
        parser.finish()?;
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(encoding: &str) -> Result<Type, ParseError> {
        Type::from_encoding(encoding)
    }

    fn fail(encoding: &str) -> ParseError {
        parse(encoding).unwrap_err()
    }

    #[test]
    fn primitives() {
        for p in Primitive::ALL {
            if p == Primitive::OpaquePointer {
                continue;
            }
            let encoding = [p.encoding()];
            let text = core::str::from_utf8(&encoding).unwrap();
            assert_eq!(parse(text).unwrap().as_primitive(), Some(p));
        }
        assert_eq!(parse("^?").unwrap().as_primitive(), Some(Primitive::OpaquePointer));
        assert!(!parse("^?").unwrap().is_const());
        assert_eq!(parse("*").unwrap().size(), size_of::<usize>());
    }

    #[test]
    fn const_placement_is_equivalent() {
        let before = parse("r^i").unwrap();
        let after = parse("^ri").unwrap();
        assert_eq!(before.hash(), after.hash());
        assert!(!before.is_const());
        assert!(before.as_pointee().unwrap().is_const());

        let plain = parse("^i").unwrap();
        assert_ne!(plain.hash(), after.hash());
        assert!(parse("rrc").unwrap().is_const());

        let opaque = parse("r^?").unwrap();
        assert_eq!(opaque.as_primitive(), Some(Primitive::OpaquePointer));
        assert!(opaque.is_const());
        assert_ne!(opaque.hash(), parse("^?").unwrap().hash());
    }

    #[test]
    fn arrays() {
        let ty = parse("[3[2s]]").unwrap();
        let outer = ty.as_array().unwrap();
        assert_eq!(outer.len(), 3);
        assert_eq!(outer.item().as_array().unwrap().len(), 2);
        assert_eq!(ty.size(), 12);

        assert_eq!(fail("[i]"), ParseError::InvalidArrayLength { offset: 0 });
        assert_eq!(fail("[3i"), ParseError::UnexpectedEnd { offset: 3 });
        assert_eq!(
            fail("[3ii]"),
            ParseError::MissingLiteral {
                expected: ']',
                found: 'i',
                offset: 3
            }
        );
    }

    #[test]
    fn struct_fields_and_tags() {
        let ty = parse(
            "{ParsedRecord=i{$len$10=}^i{$nums$11$sized_by_len$optional=}c{$flag$12}d}",
        )
        .unwrap();
        let info = ty.as_struct().unwrap();
        assert_eq!(info.name(), "ParsedRecord");
        assert_eq!(info.len(), 4);

        let nums = info.field("nums").unwrap();
        assert_eq!(nums.modifiers()[0].to_string(), "sized_by_len");
        assert_eq!(nums.length_field_name(), Some("len"));
        assert!(nums.is_optional());
        assert_eq!(nums.offset(), 8);

        let flag = info.field("flag").unwrap();
        assert!(flag.modifiers().is_empty());

        // The trailing `d` has no tag.
        let last = &info.fields()[3];
        assert_eq!(last.name(), None);
        assert_eq!(last.offset(), 24);
    }

    #[test]
    fn legacy_sizedby_names_any_field() {
        let ty = parse("{ParsedLegacySized=i{$optional$1=}^i{$nums$2$sizedby$optional=}}").unwrap();
        let nums = ty.field("nums").unwrap();
        assert_eq!(nums.length_field(), Some("optional"));
        assert!(!nums.is_optional());
    }

    #[test]
    fn empty_modifier_tokens_are_skipped() {
        let ty = parse("{ParsedEmptyMods=i{$a$1$$optional$=}}").unwrap();
        let a = ty.field("a").unwrap();
        assert_eq!(a.modifiers(), &[Modifier::Optional]);
    }

    #[test]
    fn legacy_wrapper() {
        let wrapped = parse("{ParsedLegacy=(?=i{$a$1=})(?=f{$b$2=})}").unwrap();
        assert_eq!(wrapped.field("b").unwrap().offset(), 4);

        assert_eq!(
            fail("{ParsedLegacyOpen=(?=i{$a$1=}}"),
            ParseError::MissingLiteral {
                expected: ')',
                found: '}',
                offset: 29
            }
        );
    }

    #[test]
    fn unions() {
        let ty = parse("(ParsedUnion=i{$i$1=}d{$d$2=})").unwrap();
        let info = ty.as_union().unwrap();
        assert!(info.iter().all(|f| f.offset() == 0));
        assert_eq!(ty.size(), 8);
    }

    #[test]
    fn end_of_input_versus_missing_literal() {
        assert_eq!(fail("{Invalid"), ParseError::UnexpectedEnd { offset: 8 });
        assert_eq!(fail(""), ParseError::UnexpectedEnd { offset: 0 });
        assert_eq!(fail("^"), ParseError::UnexpectedEnd { offset: 1 });
        assert!(matches!(
            parse("{ParsedBadTag=i{$a$1=x}}"),
            Err(ParseError::MissingLiteral { expected: '}', .. })
        ));
        assert!(matches!(
            parse("{ParsedOpenTag=i{$a$1"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn rejected_inputs() {
        assert_eq!(fail("x"), ParseError::UnknownEncoding { byte: 'x', offset: 0 });
        assert_eq!(fail("ii"), ParseError::TrailingInput { offset: 1 });
        assert_eq!(fail("{ParsedVoid=v{$v$1=}}"), ParseError::VoidField { offset: 12 });
        assert!(parse("^v").is_ok());
    }

    #[test]
    fn forward_reference_without_definition() {
        let cache = TypeCache::new();
        let ty = Parser::new("r{NeverDefined}")
            .with_cache(&cache)
            .parse_type()
            .unwrap();
        let info = ty.as_struct().unwrap();
        assert!(info.is_forward());
        assert!(ty.is_const());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn cursor_advances() {
        let mut cursor = "{CursorPair=ii}[2c]";
        let first = parse_type(&mut cursor).unwrap();
        assert_eq!(first.size(), 8);
        assert_eq!(cursor, "[2c]");
        parse_type(&mut cursor).unwrap();
        assert!(cursor.is_empty());
    }
}
