use core::fmt;
use core::ptr;

use ctype_ptr::PtrMut;
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, Visitor};

use super::driver::ValueSeed;

use crate::info::Type;
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;
use crate::value::scalar::write_pointer;

/// A [`Visitor`] for pointer slots.
///
/// `null` stores a null pointer. Anything else allocates one zeroed pointee
/// on the C heap, fills it and stores its address.
pub(super) struct PointerVisitor<'v> {
    pointee: &'v Type,
    data: PtrMut<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> PointerVisitor<'v> {
    #[inline]
    pub(super) fn new(pointee: &'v Type, data: PtrMut<'v>, ctx: &'v Context<'v>) -> Self {
        Self { pointee, data, ctx }
    }
}

impl<'de> Visitor<'de> for PointerVisitor<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "null or a value of type {}", self.pointee.type_name())
    }

    fn visit_none<E: Error>(mut self) -> Result<(), E> {
        // SAFETY: A pointer slot of the target.
        unsafe { write_pointer(self.data.reborrow(), ptr::null_mut()) };
        Ok(())
    }

    #[inline]
    fn visit_unit<E: Error>(self) -> Result<(), E> {
        self.visit_none()
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        let pointee = self.ctx.cache.resolve_forward(self.pointee);
        let size = pointee.size();
        if size == 0 {
            return Err(self.ctx.de_error(JsonErrorKind::Unsupported(
                format!("a value behind a pointer to {}", pointee.type_name()).into(),
            )));
        }

        // SAFETY: A pointer slot of the target.
        let block = unsafe { self.ctx.journal.attach_zeroed(self.data, 1, size) }
            .map_err(|kind| self.ctx.de_error::<D::Error>(kind))?;
        // SAFETY: The block holds one zeroed pointee.
        let data = unsafe { PtrMut::new(block) };
        ValueSeed::new(&pointee, data, self.ctx).deserialize(deserializer)
    }
}
