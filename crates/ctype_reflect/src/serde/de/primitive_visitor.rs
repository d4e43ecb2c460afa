use core::fmt;
use core::ptr;

use ctype_ptr::PtrMut;
use serde_core::de::{Error, MapAccess, SeqAccess, Visitor};

use crate::info::Primitive;
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;
use crate::value::scalar::{write_float, write_integer, write_pointer};

/// A [`Visitor`] writing one JSON scalar into a primitive slot.
///
/// Integers are range checked against the slot's width. Floats accept any
/// number. `_Bool` accepts `true`, `false`, `0` and `1`. `char *` accepts a
/// string, copied to the C heap, or `null`.
pub(super) struct PrimitiveVisitor<'v> {
    primitive: Primitive,
    data: PtrMut<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> PrimitiveVisitor<'v> {
    #[inline]
    pub(super) fn new(primitive: Primitive, data: PtrMut<'v>, ctx: &'v Context<'v>) -> Self {
        Self {
            primitive,
            data,
            ctx,
        }
    }

    fn mismatch<E: Error>(&self, found: &str) -> E {
        self.ctx
            .de_error(JsonErrorKind::mismatch(self.primitive.type_name(), found))
    }

    fn integer<E: Error>(mut self, value: i128) -> Result<(), E> {
        let primitive = self.primitive;
        if primitive.is_float() {
            // SAFETY: The slot holds a floating-point value of this width.
            unsafe { write_float(self.data.reborrow(), primitive, value as f64) };
            return Ok(());
        }
        if !primitive.is_integer() && primitive != Primitive::Bool {
            return Err(self.mismatch("a number"));
        }
        // SAFETY: The slot holds an integer of this width.
        unsafe { write_integer(self.data.reborrow(), primitive, value) }.map_err(|_| {
            self.ctx.de_error(JsonErrorKind::OutOfRange {
                value: value.to_string().into(),
                target: primitive.type_name().into(),
            })
        })
    }
}

impl<'de> Visitor<'de> for PrimitiveVisitor<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a value of type {}", self.primitive)
    }

    fn visit_bool<E: Error>(self, v: bool) -> Result<(), E> {
        match self.primitive {
            Primitive::Bool => self.integer(i128::from(v)),
            _ => Err(self.mismatch("a boolean")),
        }
    }

    #[inline]
    fn visit_i64<E: Error>(self, v: i64) -> Result<(), E> {
        self.integer(i128::from(v))
    }

    #[inline]
    fn visit_u64<E: Error>(self, v: u64) -> Result<(), E> {
        self.integer(i128::from(v))
    }

    #[inline]
    fn visit_i128<E: Error>(self, v: i128) -> Result<(), E> {
        self.integer(v)
    }

    fn visit_f64<E: Error>(mut self, v: f64) -> Result<(), E> {
        if !self.primitive.is_float() {
            return Err(self.mismatch("a fractional number"));
        }
        // SAFETY: The slot holds a floating-point value of this width.
        unsafe { write_float(self.data.reborrow(), self.primitive, v) };
        Ok(())
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<(), E> {
        if self.primitive != Primitive::CString {
            return Err(self.mismatch("a string"));
        }
        // SAFETY: A `char *` slot of the target.
        unsafe { self.ctx.journal.attach_c_string(self.data, v.as_bytes()) }
            .map_err(|kind| self.ctx.de_error(kind))
    }

    fn visit_unit<E: Error>(mut self) -> Result<(), E> {
        match self.primitive {
            Primitive::CString | Primitive::OpaquePointer => {
                // SAFETY: A pointer slot of the target.
                unsafe { write_pointer(self.data.reborrow(), ptr::null_mut()) };
                Ok(())
            }
            _ => Err(self.mismatch("null")),
        }
    }

    #[inline]
    fn visit_none<E: Error>(self) -> Result<(), E> {
        self.visit_unit()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<(), A::Error> {
        Err(self.mismatch("an array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<(), A::Error> {
        Err(self.mismatch("an object"))
    }
}
