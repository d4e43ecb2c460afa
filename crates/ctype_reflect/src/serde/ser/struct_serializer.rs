use alloc::vec::Vec;
use core::ptr::NonNull;

use ctype_ptr::Ptr;
use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use super::array_serializer::ArraySerializer;
use super::driver::ValueSerializer;
use super::primitive_serializer::byte_text;

use crate::info::{CompositeInfo, Field, Type};
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;
use crate::value::scalar::{read_integer, read_pointer, read_sized_bytes};
use crate::value::tag::select_arm;

/// A serializer for struct values.
pub(super) struct StructSerializer<'v> {
    info: &'v CompositeInfo,
    data: Ptr<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> StructSerializer<'v> {
    #[inline]
    pub(super) fn new(info: &'v CompositeInfo, data: Ptr<'v>, ctx: &'v Context<'v>) -> Self {
        Self { info, data, ctx }
    }

    /// The element count held by the length field of `field`.
    fn sized_len(&self, field: &Field, length_field: &str) -> Option<usize> {
        let length = self.info.field(length_field)?;
        let primitive = length.ty().as_primitive()?;
        // SAFETY: Field offsets lie within the struct.
        let value = unsafe { read_integer(self.data.byte_add(length.offset()), primitive) }?;
        let len = usize::try_from(value).ok();
        if len.is_none() {
            log::trace!("length field of `{}` holds {value}", field.name().unwrap_or_default());
        }
        len
    }
}

impl Serialize for StructSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self
            .info
            .iter()
            .filter_map(|f| Some((f.json_key()?, f)))
            .filter(|(_, f)| !f.skips_serialise())
            .collect::<Vec<_>>();

        let mut state = serializer.serialize_map(Some(fields.len()))?;

        for (key, field) in fields {
            // SAFETY: Field offsets lie within the struct.
            let slot = unsafe { self.data.byte_add(field.offset()) };

            self.ctx.at_key(key, || {
                if let Some(length_field) = field.length_field()
                    && field.ty().is_sizable()
                {
                    let Some(len) = self.sized_len(field, length_field) else {
                        let name = field.name().unwrap_or_default();
                        return Err(self.ctx.ser_error(JsonErrorKind::InvalidLength(name.into())));
                    };
                    state.serialize_entry(key, &SizedSerializer::new(field.ty(), slot, len, self.ctx))
                } else if let Some(tag_field) = field.tagged_by() {
                    let arms = self.ctx.cache.resolve_forward(field.ty());
                    let Some(union) = arms.as_union() else {
                        let name = field.name().unwrap_or_default();
                        return Err(self.ctx.ser_error(JsonErrorKind::UntaggedUnion(name.into())));
                    };
                    // SAFETY: The struct is initialized, tag field included.
                    match unsafe { select_arm(self.info, tag_field, union, self.data) } {
                        Ok(index) => {
                            let arm = &union.fields()[index];
                            // SAFETY: Arms lie within the union.
                            let data = unsafe { slot.byte_add(arm.offset()) };
                            state.serialize_entry(key, &ValueSerializer::new(arm.ty(), data, self.ctx))
                        }
                        Err(reason) => Err(self.ctx.ser_error(JsonErrorKind::UnresolvedUnion {
                            field: key.into(),
                            reason: reason.describe(),
                        })),
                    }
                } else {
                    state.serialize_entry(key, &ValueSerializer::new(field.ty(), slot, self.ctx))
                }
            })?;
        }

        state.end()
    }
}

// -----------------------------------------------------------------------------
// SizedSerializer

/// A serializer for a `char *` or pointer field whose element count lives in
/// a sibling field.
struct SizedSerializer<'v> {
    ty: &'v Type,
    slot: Ptr<'v>,
    len: usize,
    ctx: &'v Context<'v>,
}

impl<'v> SizedSerializer<'v> {
    #[inline]
    fn new(ty: &'v Type, slot: Ptr<'v>, len: usize, ctx: &'v Context<'v>) -> Self {
        Self { ty, slot, len, ctx }
    }
}

impl Serialize for SizedSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.ty.as_pointee() {
            Some(item) => {
                // SAFETY: A pointer slot.
                let raw = unsafe { read_pointer(self.slot) };
                let Some(block) = NonNull::new(raw) else {
                    return serializer.serialize_none();
                };
                // SAFETY: A non-null sized pointer holds `len` elements.
                let data = unsafe { Ptr::new(block) };
                ArraySerializer::new(item, data, self.len, self.ctx).serialize(serializer)
            }
            None => {
                // SAFETY: A non-null sized string holds `len` bytes.
                match unsafe { read_sized_bytes(self.slot, self.len) } {
                    Some(bytes) => serializer.serialize_str(&byte_text(bytes)),
                    None => serializer.serialize_none(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::ffi::{c_char, c_float, c_int, c_uint};
    use core::ptr;

    use crate::info::Type;
    use crate::serde::{JsonErrorKind, to_json_string};
    use crate::value::Value;

    #[repr(C)]
    struct Counted {
        len: c_int,
        nums: *const c_int,
    }

    #[repr(C)]
    struct Renamed {
        my_val: c_int,
        hidden: c_int,
    }

    #[repr(C)]
    union Number {
        i: c_int,
        f: c_float,
    }

    #[repr(C)]
    struct Tagged {
        tag: c_uint,
        value: Number,
    }

    #[repr(C)]
    struct Text {
        len: c_int,
        text: *const c_char,
    }

    const TAGGED: &str = "{SerTagged=I{$tag$1=}(SerTaggedU=i{$i$2$tag_value_0=}f{$f$3$tag_value_1=}){$value$4$tagged_by_tag=}}";

    fn emit<T>(encoding: &str, value: &T) -> Result<String, crate::serde::JsonError> {
        let ty = Type::from_encoding(encoding).unwrap();
        to_json_string(unsafe { Value::from_ref(&ty, value) })
    }

    #[test]
    fn sized_by_array() {
        let nums = [10, 20, 30];
        let value = Counted {
            len: 2,
            nums: nums.as_ptr(),
        };
        let json = emit("{SerSized=i{$len$1=}^i{$nums$2$sized_by_len=}}", &value).unwrap();
        assert_eq!(json, r#"{"len": 2, "nums": [10, 20]}"#);

        let empty = Counted {
            len: 0,
            nums: ptr::null(),
        };
        let json = emit("{SerSized=i{$len$1=}^i{$nums$2$sized_by_len=}}", &empty).unwrap();
        assert_eq!(json, r#"{"len": 0, "nums": null}"#);
    }

    #[test]
    fn negative_length_is_rejected() {
        let value = Counted {
            len: -1,
            nums: ptr::null(),
        };
        let err = emit("{SerSized=i{$len$1=}^i{$nums$2$sized_by_len=}}", &value).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::InvalidLength(_)));
        #[cfg(feature = "debug")]
        assert_eq!(err.path(), Some("$.nums"));
    }

    #[test]
    fn sized_string_uses_length() {
        let value = Text {
            len: 3,
            text: c"abcdef".as_ptr(),
        };
        let json = emit("{SerText=i{$len$1=}*{$text$2$sizedby$len=}}", &value).unwrap();
        assert_eq!(json, r#"{"len": 3, "text": "abc"}"#);
    }

    #[test]
    fn sized_string_keeps_every_byte() {
        let bytes = [b'a', 0xFF, b'z'];
        let value = Text {
            len: 2,
            text: bytes.as_ptr().cast(),
        };
        let json = emit("{SerText=i{$len$1=}*{$text$2$sizedby$len=}}", &value).unwrap();
        assert_eq!(json, "{\"len\": 2, \"text\": \"a\u{ff}\"}");
    }

    #[test]
    fn control_bytes_are_escaped() {
        let bytes = *b"\n\t\x01\x7f\"";
        let value = Text {
            len: 5,
            text: bytes.as_ptr().cast(),
        };
        let json = emit("{SerText=i{$len$1=}*{$text$2$sizedby$len=}}", &value).unwrap();
        assert_eq!(json, r#"{"len": 5, "text": "\n\t\u0001\u007f\""}"#);

        let text = c"tab\there\x7f";
        let json = emit("{SerCString=*{$text$1=}}", &text.as_ptr()).unwrap();
        assert_eq!(json, r#"{"text": "tab\there\u007f"}"#);
    }

    #[test]
    fn renamed_and_hidden() {
        let value = Renamed {
            my_val: 42,
            hidden: 7,
        };
        let json = emit(
            "{SerRenamed=i{$my_val$1$serialise_as_MyVal=}i{$hidden$2$no_serialise=}}",
            &value,
        )
        .unwrap();
        assert_eq!(json, r#"{"MyVal": 42}"#);
    }

    #[test]
    fn tagged_union_emits_active_arm() {
        let value = Tagged {
            tag: 0,
            value: Number { i: 7 },
        };
        assert_eq!(emit(TAGGED, &value).unwrap(), r#"{"tag": 0, "value": 7}"#);

        let value = Tagged {
            tag: 1,
            value: Number { f: 1.5 },
        };
        assert_eq!(emit(TAGGED, &value).unwrap(), r#"{"tag": 1, "value": 1.5}"#);

        let value = Tagged {
            tag: 9,
            value: Number { i: 0 },
        };
        let err = emit(TAGGED, &value).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UnresolvedUnion { .. }));
    }
}
