use alloc::borrow::Cow;
use alloc::string::String;

use ctype_ptr::Ptr;
use serde_core::{Serialize, Serializer};

use crate::info::Primitive;
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;
use crate::value::scalar::{read_c_str, read_float, read_integer, read_pointer};

/// The text of a C byte string.
///
/// Bytes that are not part of valid UTF-8 become the code point of the same
/// number, so each keeps its own character instead of collapsing into U+FFFD.
pub(super) fn byte_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = core::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    let mut text = String::with_capacity(bytes.len() * 2);
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        text.extend(chunk.invalid().iter().copied().map(char::from));
    }
    Cow::Owned(text)
}

/// A serializer for a single primitive slot.
pub(super) struct PrimitiveSerializer<'v> {
    primitive: Primitive,
    data: Ptr<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> PrimitiveSerializer<'v> {
    #[inline]
    pub(super) fn new(primitive: Primitive, data: Ptr<'v>, ctx: &'v Context<'v>) -> Self {
        Self {
            primitive,
            data,
            ctx,
        }
    }
}

impl Serialize for PrimitiveSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let primitive = self.primitive;
        match primitive {
            Primitive::Bool => {
                // SAFETY: The slot holds a `_Bool`.
                let value = unsafe { read_integer(self.data, primitive) };
                serializer.serialize_bool(value == Some(1))
            }
            Primitive::Float => {
                // SAFETY: The slot holds a `float`.
                let value = unsafe { self.data.read::<f32>() };
                serializer.serialize_f32(value)
            }
            Primitive::Double | Primitive::LongDouble => {
                // SAFETY: The slot holds a floating-point value of this width.
                match unsafe { read_float(self.data, primitive) } {
                    Some(value) => serializer.serialize_f64(value),
                    None => serializer.serialize_none(),
                }
            }
            Primitive::CString => {
                // SAFETY: The slot holds null or a NUL-terminated string.
                match unsafe { read_c_str(self.data) } {
                    Some(text) => serializer.serialize_str(&byte_text(text.to_bytes())),
                    None => serializer.serialize_none(),
                }
            }
            Primitive::OpaquePointer => {
                // SAFETY: The slot holds a pointer.
                let raw = unsafe { read_pointer(self.data) };
                if raw.is_null() {
                    serializer.serialize_none()
                } else {
                    serializer.serialize_str(&format!("{raw:p}"))
                }
            }
            Primitive::Void => Err(self
                .ctx
                .ser_error(JsonErrorKind::Unsupported("a value of type void".into()))),
            _ => {
                // SAFETY: The slot holds an integer of this width.
                let Some(value) = (unsafe { read_integer(self.data, primitive) }) else {
                    return serializer.serialize_none();
                };
                serialize_integer(value, serializer)
            }
        }
    }
}

/// Writes an integer with the narrowest serde method that holds it.
fn serialize_integer<S: Serializer>(value: i128, serializer: S) -> Result<S::Ok, S::Error> {
    if let Ok(value) = i64::try_from(value) {
        serializer.serialize_i64(value)
    } else if let Ok(value) = u64::try_from(value) {
        serializer.serialize_u64(value)
    } else {
        serializer.serialize_i128(value)
    }
}

#[cfg(test)]
mod tests {
    use core::ffi::{c_schar, c_ulonglong};

    use super::*;
    use crate::registry::TypeCache;

    fn emit<T>(primitive: Primitive, value: &T) -> String {
        let cache = TypeCache::new();
        let ctx = Context::new(&cache);
        serde_json::to_string(&PrimitiveSerializer::new(primitive, Ptr::from_ref(value), &ctx))
            .unwrap()
    }

    #[test]
    fn integers_keep_their_range() {
        assert_eq!(emit(Primitive::SChar, &(-5 as c_schar)), "-5");
        assert_eq!(emit(Primitive::ULongLong, &c_ulonglong::MAX), "18446744073709551615");
        assert_eq!(emit(Primitive::Bool, &true), "true");
    }

    #[test]
    fn floats_are_shortest() {
        assert_eq!(emit(Primitive::Float, &0.1f32), "0.1");
        assert_eq!(emit(Primitive::Double, &2.5f64), "2.5");
        assert_eq!(emit(Primitive::Double, &3.0f64), "3.0");
    }
}
