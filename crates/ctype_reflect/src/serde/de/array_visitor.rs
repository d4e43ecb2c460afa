use core::fmt;

use ctype_ptr::PtrMut;
use serde_core::de::{IgnoredAny, SeqAccess, Visitor};

use super::driver::ValueSeed;

use crate::info::Type;
use crate::serde::JsonErrorKind;
use crate::serde::context::Context;

/// A [`Visitor`] filling `len` consecutive elements of `item`.
///
/// Covers both fixed arrays and the heap blocks of sized fields. The JSON
/// array must have exactly `len` elements.
pub(super) struct ArrayVisitor<'v> {
    item: &'v Type,
    len: usize,
    data: PtrMut<'v>,
    ctx: &'v Context<'v>,
}

impl<'v> ArrayVisitor<'v> {
    #[inline]
    pub(super) fn new(item: &'v Type, len: usize, data: PtrMut<'v>, ctx: &'v Context<'v>) -> Self {
        Self {
            item,
            len,
            data,
            ctx,
        }
    }
}

impl<'de> Visitor<'de> for ArrayVisitor<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an array of {} elements", self.len)
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<(), A::Error> {
        let item = self.ctx.cache.resolve_forward(self.item);
        let stride = item.size();

        let mut found = 0;
        while found < self.len {
            // SAFETY: The memory holds `len` elements.
            let element = unsafe { self.data.reborrow().byte_add(found * stride) };
            let seed = ValueSeed::new(&item, element, self.ctx);
            match self.ctx.at_index(found, || seq.next_element_seed(seed))? {
                Some(()) => found += 1,
                None => break,
            }
        }
        // Count the surplus for the error message.
        let mut surplus = 0;
        if found == self.len {
            while seq.next_element::<IgnoredAny>()?.is_some() {
                surplus += 1;
            }
        }

        if found + surplus != self.len {
            return Err(self.ctx.de_error(JsonErrorKind::ArrayLength {
                expected: self.len,
                found: found + surplus,
            }));
        }
        Ok(())
    }
}
