use ctype_ptr::Ptr;
use serde_core::ser::SerializeSeq;
use serde_core::{Serialize, Serializer};

use super::driver::ValueSerializer;

use crate::info::Type;
use crate::serde::context::Context;

/// A serializer for `len` consecutive elements of `item`.
///
/// Covers both fixed arrays and the heap blocks of sized fields.
pub(super) struct ArraySerializer<'v> {
    item: &'v Type,
    data: Ptr<'v>,
    len: usize,
    ctx: &'v Context<'v>,
}

impl<'v> ArraySerializer<'v> {
    #[inline]
    pub(super) fn new(item: &'v Type, data: Ptr<'v>, len: usize, ctx: &'v Context<'v>) -> Self {
        Self {
            item,
            data,
            len,
            ctx,
        }
    }
}

impl Serialize for ArraySerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let item = self.ctx.cache.resolve_forward(self.item);
        let stride = item.size();

        let mut state = serializer.serialize_seq(Some(self.len))?;
        for index in 0..self.len {
            // SAFETY: The memory holds `len` elements.
            let element = unsafe { self.data.byte_add(index * stride) };
            self.ctx.at_index(index, || {
                state.serialize_element(&ValueSerializer::new(&item, element, self.ctx))
            })?;
        }
        state.end()
    }
}
