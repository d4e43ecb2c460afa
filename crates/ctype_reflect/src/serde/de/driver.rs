use ctype_ptr::PtrMut;
use serde_core::Deserializer;
use serde_core::de::DeserializeSeed;

use super::array_visitor::ArrayVisitor;
use super::pointer_visitor::PointerVisitor;
use super::primitive_visitor::PrimitiveVisitor;
use super::struct_visitor::StructVisitor;

use crate::info::{Type, TypeKind};
use crate::registry::TypeCache;
use crate::serde::context::Context;
use crate::serde::{JsonError, JsonErrorKind};
use crate::value::ValueMut;

// -----------------------------------------------------------------------------
// DeserializeDriver

/// Fills typed memory from a serialized document, as described by its
/// [`Type`].
///
/// The target is written in place. Strings, pointees and sized arrays are
/// allocated with the C allocator and become owned by the target; see
/// [`release_value`](crate::value::release_value). If the ingest fails,
/// every block it allocated is freed again and its slot nulled, while
/// scalar slots keep whatever was written before the failure.
///
/// # Input rules
///
/// - Integers must be JSON integers within the range of the slot. Floats
///   accept any number. `_Bool` accepts `true`, `false`, `0` and `1`.
/// - `char *` and pointers accept `null`. A fixed array needs exactly its
///   length in elements.
/// - Struct members are matched by JSON key in any order. Unknown keys are
///   skipped unless [`strict`](Self::strict) is set. A repeated key is an
///   error, except for a length field echoing the length of its array.
/// - Every named field must be present unless it is `optional` or
///   `no_deserialise`.
/// - A sized field writes its element count into its length field, or
///   checks it against the value already there.
/// - A tagged union field is filled once its tag is known, whichever order
///   the two appear in.
///
/// # Examples
///
/// ```
/// use ctype_reflect::info::Type;
/// use ctype_reflect::serde::DeserializeDriver;
/// use ctype_reflect::value::ValueMut;
///
/// #[repr(C)]
/// #[derive(Default)]
/// struct Flags { x: i32, ok: bool }
///
/// let ty = Type::from_encoding("{IngestFlags=i{$x$1=}B{$ok$2=}}").unwrap();
/// let mut flags = Flags::default();
///
/// let target = unsafe { ValueMut::from_mut(&ty, &mut flags) };
/// DeserializeDriver::new(target)
///     .from_slice(br#"{"x": 42, "ok": true}"#)
///     .unwrap();
/// assert_eq!((flags.x, flags.ok), (42, true));
///
/// let target = unsafe { ValueMut::from_mut(&ty, &mut flags) };
/// let err = DeserializeDriver::new(target)
///     .strict(true)
///     .from_slice(br#"{"x": 1, "ok": false, "extra": 0}"#)
///     .unwrap_err();
/// assert_eq!(err.code(), -7);
/// ```
pub struct DeserializeDriver<'a> {
    ty: &'a Type,
    data: PtrMut<'a>,
    context: Context<'a>,
}

impl<'a> DeserializeDriver<'a> {
    /// Creates a deserializer resolving forward references through the
    /// global definition cache.
    pub fn new(target: ValueMut<'a>) -> Self {
        let (ty, data) = target.into_parts();
        Self {
            ty,
            data,
            context: Context::new(TypeCache::global()),
        }
    }

    /// Rejects object keys that match no field.
    pub fn strict(mut self, strict: bool) -> Self {
        self.context.strict = strict;
        self
    }

    /// Resolves forward references through `cache` instead.
    pub fn with_cache(mut self, cache: &'a TypeCache) -> Self {
        self.context.cache = cache;
        self
    }

    /// Fills the target from a JSON document. Trailing non-whitespace is an
    /// error.
    pub fn from_slice(mut self, json: &[u8]) -> Result<(), JsonError> {
        let mut deserializer = serde_json::Deserializer::from_slice(json);
        let result = self
            .seed()
            .deserialize(&mut deserializer)
            .and_then(|()| deserializer.end());
        match self.settle(result) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.context.into_error(error)),
        }
    }

    fn seed(&mut self) -> ValueSeed<'_> {
        ValueSeed::new(self.ty, self.data.reborrow(), &self.context)
    }

    /// Keeps the allocations of a successful ingest and undoes those of a
    /// failed one.
    fn settle<E>(&self, result: Result<(), E>) -> Result<(), E> {
        if result.is_ok() {
            self.context.journal.commit();
            return result;
        }
        // SAFETY: The journal only holds blocks attached to this target
        // during this ingest.
        let released = unsafe { self.context.journal.rollback() };
        if released > 0 {
            log::debug!(
                "ingest into `{}` failed, released {released} allocations",
                self.ty.type_name()
            );
        }
        result
    }
}

impl<'de> DeserializeSeed<'de> for DeserializeDriver<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(mut self, deserializer: D) -> Result<(), D::Error> {
        let result = self.seed().deserialize(deserializer);
        self.settle(result)
    }
}

/// Fills the memory of `target` from `json`.
///
/// See [`DeserializeDriver`] for the input rules.
pub fn json_to_value(json: &[u8], target: ValueMut<'_>) -> Result<(), JsonError> {
    DeserializeDriver::new(target).from_slice(json)
}

// -----------------------------------------------------------------------------
// ValueSeed

/// Fills the memory behind `data` as `ty`.
pub(super) struct ValueSeed<'v> {
    ty: &'v Type,
    data: PtrMut<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> ValueSeed<'v> {
    #[inline]
    pub(super) fn new(ty: &'v Type, data: PtrMut<'v>, ctx: &'v Context<'v>) -> Self {
        Self { ty, data, ctx }
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        let ty = self.ctx.cache.resolve_forward(self.ty);
        match ty.kind() {
            TypeKind::Primitive(primitive) => {
                deserializer.deserialize_any(PrimitiveVisitor::new(*primitive, self.data, self.ctx))
            }
            TypeKind::Pointer(pointee) => {
                deserializer.deserialize_option(PointerVisitor::new(pointee, self.data, self.ctx))
            }
            TypeKind::Array(array) => deserializer.deserialize_seq(ArrayVisitor::new(
                array.item(),
                array.len(),
                self.data,
                self.ctx,
            )),
            TypeKind::Struct(info) => {
                deserializer.deserialize_map(StructVisitor::new(info, self.data, self.ctx))
            }
            TypeKind::Union(info) => Err(self
                .ctx
                .de_error(JsonErrorKind::UntaggedUnion(info.name().into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::ffi::{c_char, c_int};
    use core::ptr;

    use super::*;
    use crate::serde::to_json_string;
    use crate::value::{Value, release_value};

    #[repr(C)]
    #[derive(Default)]
    struct Pair {
        a: c_int,
        b: c_int,
    }

    #[repr(C)]
    #[derive(Default)]
    struct Nested {
        pair: Pair,
        count: c_int,
    }

    #[repr(C)]
    struct Boxed {
        value: *mut c_int,
        name: *mut c_char,
    }

    const NESTED: &str = "{DeNested={DePair=i{$a$1=}i{$b$2=}}{$pair$1=}i{$count$2=}}";
    const BOXED: &str = "{DeBoxed=^i{$value$1=}*{$name$2=}}";

    #[test]
    fn nested_round_trip() {
        let ty = Type::from_encoding(NESTED).unwrap();
        let mut nested = Nested::default();
        let json = br#"{"pair": {"a": 1, "b": 2}, "count": 3}"#;
        json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut nested) }).unwrap();
        assert_eq!((nested.pair.a, nested.pair.b, nested.count), (1, 2, 3));

        let emitted = to_json_string(unsafe { Value::from_ref(&ty, &nested) }).unwrap();
        assert_eq!(emitted.as_bytes(), json);
    }

    #[test]
    fn fixed_arrays_need_their_length() {
        let ty = Type::from_encoding("[3i]").unwrap();
        let mut items = [0 as c_int; 3];
        json_to_value(b"[1, 2, 3]", unsafe { ValueMut::from_mut(&ty, &mut items) }).unwrap();
        assert_eq!(items, [1, 2, 3]);

        for (json, found) in [(&b"[1, 2]"[..], 2), (&b"[1, 2, 3, 4]"[..], 4)] {
            let err = json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut items) }).unwrap_err();
            assert!(matches!(
                err.kind(),
                JsonErrorKind::ArrayLength { expected: 3, found: f } if *f == found
            ));
        }
    }

    #[test]
    fn pointers_and_strings_are_allocated() {
        let ty = Type::from_encoding(BOXED).unwrap();
        let mut boxed = Boxed {
            value: ptr::null_mut(),
            name: ptr::null_mut(),
        };

        let json = br#"{"value": 7, "name": "seven"}"#;
        json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut boxed) }).unwrap();
        assert_eq!(unsafe { *boxed.value }, 7);

        let emitted = to_json_string(unsafe { Value::from_ref(&ty, &boxed) }).unwrap();
        assert_eq!(emitted.as_bytes(), json);

        unsafe { release_value(ValueMut::from_mut(&ty, &mut boxed)) };
        assert!(boxed.value.is_null());
        assert!(boxed.name.is_null());

        let json = br#"{"value": null, "name": null}"#;
        json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut boxed) }).unwrap();
        assert!(boxed.value.is_null());
        assert!(boxed.name.is_null());
    }

    #[test]
    fn failure_releases_allocations() {
        let ty = Type::from_encoding(BOXED).unwrap();
        let mut boxed = Boxed {
            value: ptr::null_mut(),
            name: ptr::null_mut(),
        };

        let json = br#"{"value": 7, "name": 8}"#;
        let err = json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut boxed) }).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::TypeMismatch(_)));
        #[cfg(feature = "debug")]
        assert_eq!(err.path(), Some("$.name"));
        assert!(boxed.value.is_null());
    }

    #[test]
    fn malformed_documents() {
        let ty = Type::from_encoding(NESTED).unwrap();
        let mut nested = Nested::default();

        let trailing = br#"{"pair": {"a": 1, "b": 2}, "count": 3} {}"#;
        for json in [&b"{"[..], br#"{"count": 1,}"#, trailing, b""] {
            let err =
                json_to_value(json, unsafe { ValueMut::from_mut(&ty, &mut nested) }).unwrap_err();
            assert!(matches!(err.kind(), JsonErrorKind::Malformed(_)), "{err}");
            assert_eq!(err.code(), -1);
        }

        let err = json_to_value(b"[]", unsafe { ValueMut::from_mut(&ty, &mut nested) }).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn bare_unions_are_rejected() {
        let ty = Type::from_encoding("(DeBare=i{$i$1=}f{$f$2=})").unwrap();
        let mut slot: c_int = 0;
        let err = json_to_value(b"1", unsafe { ValueMut::from_mut(&ty, &mut slot) }).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UntaggedUnion(_)));
    }
}
