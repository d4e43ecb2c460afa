use alloc::string::String;
use alloc::vec::Vec;
use core::ptr::NonNull;
use std::io;

use ctype_ptr::Ptr;
use serde_core::{Serialize, Serializer};

use super::InlineFormatter;
use super::array_serializer::ArraySerializer;
use super::primitive_serializer::PrimitiveSerializer;
use super::struct_serializer::StructSerializer;

use crate::info::{Type, TypeKind};
use crate::registry::TypeCache;
use crate::serde::context::Context;
use crate::serde::{JsonError, JsonErrorKind};
use crate::value::Value;
use crate::value::scalar::read_pointer;

// -----------------------------------------------------------------------------
// SerializeDriver

/// Serializes typed memory as described by its [`Type`].
///
/// Implements [`Serialize`], so any serde data format can drive it. JSON
/// output goes through [`write_json`](Self::write_json), which also turns a
/// failure into a typed [`JsonError`].
///
/// # Output rules
///
/// - Integers are written as numbers, floats in their shortest round-trip
///   form, `_Bool` as `true` / `false`, `char *` as a string.
/// - Null pointers and strings are written as `null`. Other pointers are
///   followed. Opaque pointers are written as their hex address.
/// - Struct fields appear in declaration order under their JSON key. Fields
///   marked `no_serialise` and anonymous fields are left out.
/// - A sized field is written with as many elements (or bytes) as its length
///   field holds.
/// - A tagged union field is written as its active arm. A union reached any
///   other way is an error.
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::Type;
/// use ctype_reflect::serde::SerializeDriver;
/// use ctype_reflect::value::Value;
///
/// #[repr(C)]
/// struct Flags { x: i32, ok: bool }
///
/// let ty = Type::from_encoding("{DriverFlags=i{$x$1=}B{$ok$2=}}").unwrap();
/// let flags = Flags { x: 42, ok: true };
/// let value = unsafe { Value::from_ref(&ty, &flags) };
///
/// let json = SerializeDriver::new(value).to_json_string().unwrap();
/// assert_eq!(json, r#"{"x": 42, "ok": true}"#);
///
/// // Any other serializer works too.
/// let compact = serde_json::to_string(&SerializeDriver::new(value)).unwrap();
/// assert_eq!(compact, r#"{"x":42,"ok":true}"#);
/// ```
pub struct SerializeDriver<'a> {
    value: Value<'a>,
    context: Context<'a>,
}

impl<'a> SerializeDriver<'a> {
    /// Creates a serializer resolving forward references through the
    /// global definition cache.
    pub fn new(value: Value<'a>) -> Self {
        Self {
            value,
            context: Context::new(TypeCache::global()),
        }
    }

    /// Resolves forward references through `cache` instead.
    pub fn with_cache(mut self, cache: &'a TypeCache) -> Self {
        self.context.cache = cache;
        self
    }

    /// Writes the value as single-line JSON.
    pub fn write_json<W: io::Write>(self, writer: W) -> Result<(), JsonError> {
        let mut serializer = serde_json::Serializer::with_formatter(writer, InlineFormatter);
        match self.serialize(&mut serializer) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.context.into_error(error)),
        }
    }

    /// Renders the value as a single-line JSON string.
    pub fn to_json_string(self) -> Result<String, JsonError> {
        let mut out = Vec::new();
        self.write_json(&mut out)?;
        String::from_utf8(out).map_err(|e| {
            JsonErrorKind::Io(io::Error::new(io::ErrorKind::InvalidData, e)).into()
        })
    }
}

impl Serialize for SerializeDriver<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValueSerializer::new(self.value.ty(), self.value.data(), &self.context).serialize(serializer)
    }
}

/// Writes `value` to `writer` as JSON.
///
/// See [`SerializeDriver`] for the output rules.
pub fn value_to_json<W: io::Write>(writer: W, value: Value<'_>) -> Result<(), JsonError> {
    SerializeDriver::new(value).write_json(writer)
}

/// Renders `value` as a JSON string.
///
/// See [`SerializeDriver`] for the output rules.
pub fn to_json_string(value: Value<'_>) -> Result<String, JsonError> {
    SerializeDriver::new(value).to_json_string()
}

// -----------------------------------------------------------------------------
// ValueSerializer

/// Serializes the memory behind `data` as `ty`.
pub(super) struct ValueSerializer<'v> {
    ty: &'v Type,
    data: Ptr<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> ValueSerializer<'v> {
    #[inline]
    pub(super) fn new(ty: &'v Type, data: Ptr<'v>, ctx: &'v Context<'v>) -> Self {
        Self { ty, data, ctx }
    }
}

impl Serialize for ValueSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ty = self.ctx.cache.resolve_forward(self.ty);
        match ty.kind() {
            TypeKind::Primitive(primitive) => {
                PrimitiveSerializer::new(*primitive, self.data, self.ctx).serialize(serializer)
            }
            TypeKind::Pointer(pointee) => {
                // SAFETY: A pointer slot of an initialized value.
                let raw = unsafe { read_pointer(self.data) };
                let Some(target) = NonNull::new(raw) else {
                    return serializer.serialize_none();
                };
                if self.ctx.cache.resolve_forward(pointee).size() == 0 {
                    return serializer.serialize_str(&format!("{raw:p}"));
                }
                // SAFETY: Non-null pointers of a value point to their pointee.
                let data = unsafe { Ptr::new(target) };
                serializer.serialize_some(&ValueSerializer::new(pointee, data, self.ctx))
            }
            TypeKind::Array(array) => {
                ArraySerializer::new(array.item(), self.data, array.len(), self.ctx)
                    .serialize(serializer)
            }
            TypeKind::Struct(info) => {
                StructSerializer::new(info, self.data, self.ctx).serialize(serializer)
            }
            TypeKind::Union(info) => Err(self
                .ctx
                .ser_error(JsonErrorKind::UntaggedUnion(info.name().into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::ffi::{c_char, c_int};
    use core::ptr;

    use super::*;

    #[repr(C)]
    struct Pair {
        a: c_int,
        b: c_int,
    }

    #[repr(C)]
    struct Nested {
        pair: Pair,
        count: c_int,
    }

    #[repr(C)]
    struct Linked {
        value: c_int,
        next: *const Linked,
    }

    fn emit<T>(encoding: &str, value: &T) -> Result<String, JsonError> {
        let ty = Type::from_encoding(encoding).unwrap();
        to_json_string(unsafe { Value::from_ref(&ty, value) })
    }

    #[test]
    fn nested_struct() {
        let nested = Nested {
            pair: Pair { a: 1, b: 2 },
            count: 3,
        };
        let json = emit(
            "{SerNested={SerPair=i{$a$1=}i{$b$2=}}{$pair$1=}i{$count$2=}}",
            &nested,
        )
        .unwrap();
        assert_eq!(json, r#"{"pair": {"a": 1, "b": 2}, "count": 3}"#);
    }

    #[test]
    fn fixed_array() {
        let json = emit("[3i]", &[1, 2, 3]).unwrap();
        assert_eq!(json, "[1, 2, 3]");
    }

    #[test]
    fn pointers_follow_or_null() {
        let seven: c_int = 7;
        let some: *const c_int = &seven;
        let none: *const c_int = ptr::null();
        assert_eq!(emit("^i", &some).unwrap(), "7");
        assert_eq!(emit("^i", &none).unwrap(), "null");

        let opaque: *const u8 = 0x10 as *const u8;
        assert_eq!(emit("^v", &opaque).unwrap(), r#""0x10""#);
        assert_eq!(emit("^?", &opaque).unwrap(), r#""0x10""#);
    }

    #[test]
    fn self_referential_list() {
        let tail = Linked {
            value: 2,
            next: ptr::null(),
        };
        let head = Linked {
            value: 1,
            next: &tail,
        };
        let json = emit("{SerLinked=i{$value$1=}^{SerLinked}{$next$2=}}", &head).unwrap();
        assert_eq!(json, r#"{"value": 1, "next": {"value": 2, "next": null}}"#);
    }

    #[test]
    fn strings_escape() {
        let text = c"say \"hi\"\n";
        let slot: *const c_char = text.as_ptr();
        assert_eq!(emit("*", &slot).unwrap(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn bare_union_is_rejected() {
        let err = emit("(SerBare=i{$i$1=}f{$f$2=})", &0i32).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UntaggedUnion(name) if &**name == "SerBare"));
        assert_eq!(err.code(), -10);
    }
}
