use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ptr;

use ctype_ptr::PtrMut;
use fixedbitset::FixedBitSet;
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::Value as JsonValue;
use serde_json::value::RawValue;

use super::array_visitor::ArrayVisitor;
use super::driver::ValueSeed;

use crate::info::{CompositeInfo, Field};
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;
use crate::value::scalar::{read_integer, write_integer, write_pointer};
use crate::value::tag::select_arm;

/// A [`Visitor`] filling a struct from a JSON object.
///
/// Members are matched in a first pass. Tagged unions whose tag has not been
/// read yet are kept as raw JSON text and filled in a second pass, once every
/// tag is in place. Required fields are checked last.
pub(super) struct StructVisitor<'v> {
    info: &'v CompositeInfo,
    data: PtrMut<'v>,
    ctx: &'v Context<'v>,
    seen: FixedBitSet,
    /// Length fields written from the size of their array.
    from_array: FixedBitSet,
}

impl<'v> StructVisitor<'v> {
    pub(super) fn new(info: &'v CompositeInfo, data: PtrMut<'v>, ctx: &'v Context<'v>) -> Self {
        Self {
            info,
            data,
            ctx,
            seen: FixedBitSet::with_capacity(info.len()),
            from_array: FixedBitSet::with_capacity(info.len()),
        }
    }

    #[inline]
    fn fail<E: Error>(&self, kind: JsonErrorKind) -> E {
        self.ctx.de_error(kind)
    }

    /// Whether the tag sibling of a union can be read now.
    fn tag_ready(&self, tag_field: &str) -> bool {
        match self.info.field_index(tag_field) {
            Some(index) => self.seen.contains(index) || self.info.fields()[index].skips_deserialise(),
            // Selection reports the missing field.
            None => true,
        }
    }

    /// Selects the active arm of a tagged union field and fills it through
    /// `fill`.
    fn fill_arm<E: Error>(
        &mut self,
        field: &Field,
        tag_field: &str,
        fill: impl FnOnce(ValueSeed<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        let name = field.name().unwrap_or_default();
        let union = self.ctx.cache.resolve_forward(field.ty());
        let Some(arms) = union.as_union() else {
            return Err(self.fail(JsonErrorKind::UntaggedUnion(name.into())));
        };
        // SAFETY: The tag field has been written or was never meant to be.
        let index = unsafe { select_arm(self.info, tag_field, arms, self.data.borrow()) }
            .map_err(|reason| {
                self.fail::<E>(JsonErrorKind::UnresolvedUnion {
                    field: name.into(),
                    reason: reason.describe(),
                })
            })?;
        let arm = &arms.fields()[index];
        // SAFETY: The arm lies within the union, which lies within the struct.
        let slot = unsafe { self.data.reborrow().byte_add(field.offset() + arm.offset()) };
        fill(ValueSeed::new(arm.ty(), slot, self.ctx))
    }

    /// Fills a `char *` or pointer field whose element count lives in the
    /// sibling `length_field`.
    ///
    /// The sibling receives the count unless it was already read, in which
    /// case the two must agree.
    fn fill_sized(
        &mut self,
        field: &Field,
        length_field: &str,
        raw: &RawValue,
    ) -> Result<(), serde_json::Error> {
        let name = field.name().unwrap_or_default();
        let info = self.info;

        let length = info
            .field_index(length_field)
            .map(|index| (index, &info.fields()[index]))
            .and_then(|(index, f)| Some((index, f, f.ty().as_primitive()?)))
            .filter(|(_, _, primitive)| primitive.is_integer());
        let Some((length_index, length, primitive)) = length else {
            return Err(self.fail(JsonErrorKind::InvalidLength(name.into())));
        };

        let pointee = field.ty().as_pointee();
        let shape = serde_json::Deserializer::from_str(raw.get()).deserialize_any(Measure)?;
        let measured = match (&shape, pointee) {
            (Shape::Null, _) => 0,
            (Shape::Items(count), Some(_)) => *count,
            (Shape::Text(text), None) => text.len(),
            (other, _) => {
                let expected = if pointee.is_some() { "an array" } else { "a string" };
                return Err(self.fail(JsonErrorKind::mismatch(expected, other.kind())));
            }
        };

        // SAFETY: Field offsets lie within the struct.
        let length_slot = unsafe { self.data.reborrow().byte_add(length.offset()) };
        if self.seen.contains(length_index) {
            // SAFETY: An integer slot that was written earlier.
            let stored = unsafe { read_integer(length_slot.borrow(), primitive) }.unwrap_or_default();
            if stored != measured as i128 {
                return Err(self.fail(JsonErrorKind::LengthMismatch {
                    field: name.into(),
                    expected: stored,
                    found: measured,
                }));
            }
        } else if !length.skips_deserialise() {
            // SAFETY: An integer slot of the struct.
            unsafe { write_integer(length_slot, primitive, measured as i128) }.map_err(|_| {
                self.fail::<serde_json::Error>(JsonErrorKind::OutOfRange {
                    value: measured.to_string().into(),
                    target: primitive.type_name().into(),
                })
            })?;
            self.seen.insert(length_index);
            self.from_array.insert(length_index);
        }

        // SAFETY: Field offsets lie within the struct.
        let slot = unsafe { self.data.reborrow().byte_add(field.offset()) };
        match (shape, pointee) {
            (Shape::Text(text), _) => {
                // SAFETY: A `char *` slot of the struct.
                unsafe { self.ctx.journal.attach_c_string(slot, text.as_bytes()) }
                    .map_err(|kind| self.fail(kind))
            }
            (Shape::Items(_), Some(item)) => {
                let item = self.ctx.cache.resolve_forward(item);
                if item.size() == 0 {
                    return Err(self.fail(JsonErrorKind::Unsupported(
                        format!("an array of {}", item.type_name()).into(),
                    )));
                }
                // SAFETY: A pointer slot of the struct.
                let block = unsafe { self.ctx.journal.attach_zeroed(slot, measured, item.size()) }
                    .map_err(|kind| self.fail::<serde_json::Error>(kind))?;
                // SAFETY: The block holds `measured` zeroed elements.
                let data = unsafe { PtrMut::new(block) };
                serde_json::Deserializer::from_str(raw.get())
                    .deserialize_seq(ArrayVisitor::new(&item, measured, data, self.ctx))
            }
            _ => {
                // SAFETY: A pointer slot of the struct.
                unsafe { write_pointer(slot, ptr::null_mut()) };
                Ok(())
            }
        }
    }

    /// Checks a repeated length field against the count its array wrote.
    fn verify_echo(&mut self, index: usize, value: &JsonValue) -> Result<(), serde_json::Error> {
        let length = &self.info.fields()[index];
        let Some(primitive) = length.ty().as_primitive() else {
            return Ok(());
        };
        // SAFETY: Field offsets lie within the struct.
        let stored = unsafe { read_integer(self.data.borrow().byte_add(length.offset()), primitive) }
            .unwrap_or_default();

        let echoed = match value {
            JsonValue::Number(n) => n.as_i64().map(i128::from).or(n.as_u64().map(i128::from)),
            _ => None,
        };
        let Some(echoed) = echoed else {
            return Err(self.fail(JsonErrorKind::mismatch(primitive.type_name(), json_kind(value))));
        };

        if echoed != stored {
            let sized = self
                .info
                .iter()
                .find(|f| f.length_field() == length.name())
                .and_then(Field::name)
                .unwrap_or_default();
            return Err(self.fail(JsonErrorKind::LengthMismatch {
                field: sized.into(),
                expected: echoed,
                found: usize::try_from(stored).unwrap_or_default(),
            }));
        }
        // A third appearance is a plain duplicate.
        self.from_array.set(index, false);
        Ok(())
    }

    /// Fills one matched member.
    fn visit_field<'de, A: MapAccess<'de>>(
        &mut self,
        index: usize,
        field: &Field,
        map: &mut A,
        pending: &mut Vec<(usize, Box<RawValue>)>,
    ) -> Result<(), A::Error> {
        if field.skips_deserialise() {
            map.next_value::<IgnoredAny>()?;
        } else if let Some(length_field) = field.length_field()
            && field.ty().is_sizable()
        {
            let raw = map.next_value::<Box<RawValue>>()?;
            self.fill_sized(field, length_field, &raw)
                .map_err(A::Error::custom)?;
        } else if let Some(tag_field) = field.tagged_by() {
            if self.tag_ready(tag_field) {
                self.fill_arm(field, tag_field, |seed| map.next_value_seed(seed))?;
            } else {
                pending.push((index, map.next_value::<Box<RawValue>>()?));
            }
        } else {
            // SAFETY: Field offsets lie within the struct.
            let slot = unsafe { self.data.reborrow().byte_add(field.offset()) };
            map.next_value_seed(ValueSeed::new(field.ty(), slot, self.ctx))?;
        }
        self.seen.insert(index);
        Ok(())
    }
}

impl<'de> Visitor<'de> for StructVisitor<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an object for struct {}", self.info.name())
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut map: A) -> Result<(), A::Error> {
        let info = self.info;
        let ctx = self.ctx;
        let mut pending = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            let Some((index, field)) = info.field_by_key(&key) else {
                if ctx.strict {
                    return Err(self.fail(JsonErrorKind::UnknownField(key.into())));
                }
                map.next_value::<IgnoredAny>()?;
                continue;
            };

            if self.seen.contains(index) {
                if !self.from_array.contains(index) {
                    return Err(self.fail(JsonErrorKind::DuplicateField(key.into())));
                }
                ctx.at_key(&key, || {
                    let value = map.next_value::<JsonValue>()?;
                    self.verify_echo(index, &value).map_err(A::Error::custom)
                })?;
                continue;
            }

            ctx.at_key(&key, || self.visit_field(index, field, &mut map, &mut pending))?;
        }

        for (index, raw) in pending {
            let field = &info.fields()[index];
            let key = field.json_key().unwrap_or_default();
            ctx.at_key(key, || {
                let Some(tag_field) = field.tagged_by() else {
                    return Ok(());
                };
                if !self.tag_ready(tag_field) {
                    return Err(self.fail(JsonErrorKind::UnresolvedUnion {
                        field: key.into(),
                        reason: "the tag field is missing",
                    }));
                }
                self.fill_arm(field, tag_field, |seed| {
                    seed.deserialize(&mut serde_json::Deserializer::from_str(raw.get()))
                        .map_err(A::Error::custom)
                })
            })?;
        }

        for (index, field) in info.iter().enumerate() {
            let Some(key) = field.json_key() else {
                continue;
            };
            if !self.seen.contains(index) && !field.is_optional() && !field.skips_deserialise() {
                return Err(self.fail(JsonErrorKind::MissingField(key.into())));
            }
        }

        Ok(())
    }
}

/// What a buffered member holds, read without building it.
enum Shape {
    Null,
    Items(usize),
    Text(String),
    Other(&'static str),
}

impl Shape {
    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Items(_) => "an array",
            Self::Text(_) => "a string",
            Self::Other(kind) => kind,
        }
    }
}

struct Measure;

impl<'de> Visitor<'de> for Measure {
    type Value = Shape;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_unit<E: Error>(self) -> Result<Shape, E> {
        Ok(Shape::Null)
    }

    fn visit_none<E: Error>(self) -> Result<Shape, E> {
        Ok(Shape::Null)
    }

    fn visit_bool<E: Error>(self, _: bool) -> Result<Shape, E> {
        Ok(Shape::Other("a boolean"))
    }

    fn visit_i64<E: Error>(self, _: i64) -> Result<Shape, E> {
        Ok(Shape::Other("a number"))
    }

    fn visit_u64<E: Error>(self, _: u64) -> Result<Shape, E> {
        Ok(Shape::Other("a number"))
    }

    fn visit_f64<E: Error>(self, _: f64) -> Result<Shape, E> {
        Ok(Shape::Other("a number"))
    }

    fn visit_str<E: Error>(self, text: &str) -> Result<Shape, E> {
        Ok(Shape::Text(text.into()))
    }

    fn visit_string<E: Error>(self, text: String) -> Result<Shape, E> {
        Ok(Shape::Text(text))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Shape, A::Error> {
        let mut count = 0;
        while seq.next_element::<IgnoredAny>()?.is_some() {
            count += 1;
        }
        Ok(Shape::Items(count))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Shape, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Shape::Other("an object"))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use core::ffi::{CStr, c_char, c_float, c_int, c_uchar, c_uint};
    use core::ptr;
    use core::slice;

    use crate::info::Type;
    use crate::serde::{DeserializeDriver, JsonError, JsonErrorKind, json_to_value, to_json_string};
    use crate::value::{Value, ValueMut, release_value};

    #[repr(C)]
    struct Counted {
        len: c_int,
        nums: *mut c_int,
    }

    impl Counted {
        fn empty() -> Self {
            Self {
                len: 0,
                nums: ptr::null_mut(),
            }
        }

        fn nums(&self) -> &[c_int] {
            unsafe { slice::from_raw_parts(self.nums, self.len as usize) }
        }
    }

    #[repr(C)]
    struct ShortSized {
        len: c_uchar,
        nums: *mut c_int,
    }

    #[repr(C)]
    struct Text {
        len: c_int,
        text: *mut c_char,
    }

    #[repr(C)]
    #[derive(Default)]
    struct Renamed {
        my_val: c_int,
        hidden: c_int,
        extra: c_int,
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
    struct Named {
        kind: *mut c_char,
        value: Number,
    }

    const SIZED: &str = "{DeSized=i{$len$1=}^i{$nums$2$sized_by_len=}}";
    const RENAMED: &str = "{DeRenamed=i{$my_val$1$serialise_as_MyVal=}i{$hidden$2$no_deserialise=}i{$extra$3$optional=}}";
    const TAGGED: &str = "{DeTagged=I{$tag$1=}(DeTaggedU=i{$i$2$tag_value_0=}f{$f$3$tag_value_1=}){$value$4$tagged_by_tag=}}";

    fn ingest<T>(encoding: &str, target: &mut T, json: &str) -> Result<(), JsonError> {
        let ty = Type::from_encoding(encoding).unwrap();
        json_to_value(json.as_bytes(), unsafe { ValueMut::from_mut(&ty, target) })
    }

    fn release<T>(encoding: &str, target: &mut T) {
        let ty = Type::from_encoding(encoding).unwrap();
        unsafe { release_value(ValueMut::from_mut(&ty, target)) };
    }

    #[test]
    fn sized_array_writes_its_length() {
        let mut sized = Counted::empty();
        ingest(SIZED, &mut sized, r#"{"nums": [5, 6, 7]}"#).unwrap();
        assert_eq!(sized.len, 3);
        assert_eq!(sized.nums(), [5, 6, 7]);
        release(SIZED, &mut sized);
        assert!(sized.nums.is_null());

        ingest(SIZED, &mut sized, r#"{"len": 2, "nums": [10, 20]}"#).unwrap();
        assert_eq!(sized.nums(), [10, 20]);

        let ty = Type::from_encoding(SIZED).unwrap();
        let json = to_json_string(unsafe { Value::from_ref(&ty, &sized) }).unwrap();
        assert_eq!(json, r#"{"len": 2, "nums": [10, 20]}"#);
        release(SIZED, &mut sized);
    }

    #[test]
    fn sized_array_accepts_its_echoed_length() {
        let mut sized = Counted::empty();
        ingest(SIZED, &mut sized, r#"{"nums": [1, 2], "len": 2}"#).unwrap();
        assert_eq!(sized.nums(), [1, 2]);
        release(SIZED, &mut sized);

        let err = ingest(SIZED, &mut sized, r#"{"nums": [1, 2], "len": 3}"#).unwrap_err();
        assert!(matches!(
            err.kind(),
            JsonErrorKind::LengthMismatch { expected: 3, found: 2, .. }
        ));
        assert!(sized.nums.is_null());

        let err = ingest(SIZED, &mut sized, r#"{"nums": [1], "len": 1, "len": 1}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::DuplicateField(_)));
    }

    #[test]
    fn sized_array_disagreeing_with_length() {
        let mut sized = Counted::empty();
        let err = ingest(SIZED, &mut sized, r#"{"len": 4, "nums": [1, 2]}"#).unwrap_err();
        assert!(matches!(
            err.kind(),
            JsonErrorKind::LengthMismatch { expected: 4, found: 2, .. }
        ));
        #[cfg(feature = "debug")]
        assert_eq!(err.path(), Some("$.nums"));
        assert!(sized.nums.is_null());
    }

    #[test]
    fn sized_null_and_empty() {
        let mut sized = Counted::empty();
        ingest(SIZED, &mut sized, r#"{"nums": null}"#).unwrap();
        assert_eq!(sized.len, 0);
        assert!(sized.nums.is_null());

        ingest(SIZED, &mut sized, r#"{"nums": []}"#).unwrap();
        assert_eq!(sized.len, 0);
        assert!(!sized.nums.is_null());

        let ty = Type::from_encoding(SIZED).unwrap();
        let json = to_json_string(unsafe { Value::from_ref(&ty, &sized) }).unwrap();
        assert_eq!(json, r#"{"len": 0, "nums": []}"#);
        release(SIZED, &mut sized);
    }

    #[test]
    fn sized_length_is_range_checked() {
        const SHORT: &str = "{DeShortSized=C{$len$1=}^i{$nums$2$sized_by_len=}}";
        let mut short = ShortSized {
            len: 0,
            nums: ptr::null_mut(),
        };
        let json = format!("{{\"nums\": [{}0]}}", "0, ".repeat(256));
        let err = ingest(SHORT, &mut short, &json).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::OutOfRange { .. }));
        assert!(short.nums.is_null());
    }

    #[test]
    fn sized_string_copies_bytes() {
        const TEXT: &str = "{DeText=i{$len$1=}*{$text$2$sizedby$len=}}";
        let mut text = Text {
            len: 0,
            text: ptr::null_mut(),
        };
        ingest(TEXT, &mut text, r#"{"text": "héllo"}"#).unwrap();
        assert_eq!(text.len, 6);
        assert_eq!(unsafe { CStr::from_ptr(text.text) }.to_str(), Ok("héllo"));
        release(TEXT, &mut text);

        let err = ingest(TEXT, &mut text, r#"{"text": [1]}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn renamed_hidden_and_optional() {
        let mut renamed = Renamed {
            hidden: 9,
            ..Default::default()
        };
        ingest(RENAMED, &mut renamed, r#"{"MyVal": 42, "hidden": 1}"#).unwrap();
        assert_eq!((renamed.my_val, renamed.hidden, renamed.extra), (42, 9, 0));

        let err = ingest(RENAMED, &mut renamed, r#"{"my_val": 42}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::MissingField(key) if &**key == "MyVal"));
        assert_eq!(err.code(), -5);
    }

    #[test]
    fn duplicate_and_unknown_keys() {
        let mut renamed = Renamed::default();
        let err = ingest(RENAMED, &mut renamed, r#"{"MyVal": 1, "MyVal": 2}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::DuplicateField(key) if &**key == "MyVal"));

        ingest(RENAMED, &mut renamed, r#"{"MyVal": 3, "other": {"x": [1]}}"#).unwrap();
        assert_eq!(renamed.my_val, 3);

        let ty = Type::from_encoding(RENAMED).unwrap();
        let target = unsafe { ValueMut::from_mut(&ty, &mut renamed) };
        let err = DeserializeDriver::new(target)
            .strict(true)
            .from_slice(br#"{"MyVal": 3, "other": 1}"#)
            .unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UnknownField(key) if &**key == "other"));
    }

    #[test]
    fn tagged_union_in_any_order() {
        let mut tagged = Tagged {
            tag: 5,
            value: Number { i: 0 },
        };
        ingest(TAGGED, &mut tagged, r#"{"value": 11, "tag": 0}"#).unwrap();
        assert_eq!(tagged.tag, 0);
        assert_eq!(unsafe { tagged.value.i }, 11);

        ingest(TAGGED, &mut tagged, r#"{"tag": 1, "value": 2.5}"#).unwrap();
        assert_eq!(unsafe { tagged.value.f }, 2.5);

        let ty = Type::from_encoding(TAGGED).unwrap();
        let json = to_json_string(unsafe { Value::from_ref(&ty, &tagged) }).unwrap();
        assert_eq!(json, r#"{"tag": 1, "value": 2.5}"#);
    }

    #[test]
    fn buffered_members_keep_duplicate_keys() {
        const BOXED: &str = "{DePointTagged=I{$tag$1=}(DePointU={DePointP=i{$x$1=}}{$point$2$tag_value_0=}){$value$3$tagged_by_tag=}}";
        let mut boxed = [0 as c_uint; 2];

        let err = ingest(BOXED, &mut boxed, r#"{"value": {"x": 1, "x": 2}, "tag": 0}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::DuplicateField(key) if &**key == "x"));

        let err = ingest(BOXED, &mut boxed, r#"{"tag": 0, "value": {"x": 1, "x": 2}}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::DuplicateField(key) if &**key == "x"));

        ingest(BOXED, &mut boxed, r#"{"value": {"x": 9}, "tag": 0}"#).unwrap();
        assert_eq!(boxed, [0, 9]);
    }

    #[test]
    fn tagged_union_failures() {
        let mut tagged = Tagged {
            tag: 0,
            value: Number { i: 0 },
        };
        let err = ingest(TAGGED, &mut tagged, r#"{"value": 1}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UnresolvedUnion { .. }));
        #[cfg(feature = "debug")]
        assert_eq!(err.path(), Some("$.value"));

        let err = ingest(TAGGED, &mut tagged, r#"{"tag": 7, "value": 1}"#).unwrap_err();
        assert!(matches!(err.kind(), JsonErrorKind::UnresolvedUnion { .. }));
        assert_eq!(err.code(), -11);
    }

    #[test]
    fn string_tags_select_by_name() {
        const NAMED: &str = "{DeNamed=*{$kind$1=}(DeNamedU=i{$num$2=}f{$real$3$tag_value_float=}){$value$4$tagged_by_kind=}}";
        let mut named = Named {
            kind: ptr::null_mut(),
            value: Number { i: 0 },
        };
        ingest(NAMED, &mut named, r#"{"value": 4, "kind": "num"}"#).unwrap();
        assert_eq!(unsafe { named.value.i }, 4);
        release(NAMED, &mut named);

        ingest(NAMED, &mut named, r#"{"kind": "float", "value": 0.5}"#).unwrap();
        assert_eq!(unsafe { named.value.f }, 0.5);
        release(NAMED, &mut named);
        assert!(named.kind.is_null());
    }
}
