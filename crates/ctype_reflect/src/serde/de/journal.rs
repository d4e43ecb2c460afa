//! Heap blocks attached to a target during one ingest.
//!
//! Every block is allocated with the C allocator so the owner of the target
//! can release it with `free`. A failed ingest rolls the journal back, which
//! leaves the target without dangling or leaked pointers.

use alloc::vec::Vec;
use core::cell::RefCell;
use core::ptr::{self, NonNull};

use ctype_ptr::PtrMut;

use crate::serde::JsonErrorKind;
use crate::value::scalar::write_pointer;

struct Allocation {
    slot: NonNull<u8>,
    block: NonNull<u8>,
}

#[derive(Default)]
pub(crate) struct Journal {
    entries: RefCell<Vec<Allocation>>,
}

impl Journal {
    /// Allocates `count` zeroed elements of `size` bytes and stores the
    /// block in the pointer `slot`.
    ///
    /// At least one element is allocated, so an empty array still gets a
    /// non-null block.
    ///
    /// # Safety
    /// `slot` must be a writable pointer slot that outlives the journal
    /// entry, either in the target or in a block attached earlier.
    pub unsafe fn attach_zeroed(
        &self,
        slot: PtrMut<'_>,
        count: usize,
        size: usize,
    ) -> Result<NonNull<u8>, JsonErrorKind> {
        let (count, size) = (count.max(1), size.max(1));
        let bytes = count
            .checked_mul(size)
            .ok_or(JsonErrorKind::Allocation(usize::MAX))?;
        // SAFETY: `calloc` may be called with any sizes.
        let raw = unsafe { libc::calloc(count, size) }.cast::<u8>();
        let block = NonNull::new(raw).ok_or(JsonErrorKind::Allocation(bytes))?;
        // SAFETY: Guaranteed by the caller.
        unsafe { self.attach(slot, block) };
        Ok(block)
    }

    /// Copies `bytes` into a fresh NUL-terminated block and stores it in the
    /// `char *` slot.
    ///
    /// # Safety
    /// Same as [`attach_zeroed`](Self::attach_zeroed).
    pub unsafe fn attach_c_string(&self, slot: PtrMut<'_>, bytes: &[u8]) -> Result<(), JsonErrorKind> {
        let size = bytes.len() + 1;
        // SAFETY: `malloc` may be called with any size.
        let raw = unsafe { libc::malloc(size) }.cast::<u8>();
        let block = NonNull::new(raw).ok_or(JsonErrorKind::Allocation(size))?;
        // SAFETY: The block holds `size` bytes.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), block.as_ptr(), bytes.len());
            block.add(bytes.len()).write(0);
            self.attach(slot, block);
        }
        Ok(())
    }

    unsafe fn attach(&self, mut slot: PtrMut<'_>, block: NonNull<u8>) {
        // SAFETY: Guaranteed by the caller.
        unsafe { write_pointer(slot.reborrow(), block.as_ptr()) };
        self.entries.borrow_mut().push(Allocation {
            slot: slot.into(),
            block,
        });
    }

    /// Hands every recorded block over to the target. Returns how many.
    pub fn commit(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Frees every recorded block, newest first, and nulls the slot that
    /// held it. Returns how many blocks were freed.
    ///
    /// # Safety
    /// The slots and blocks recorded since the last commit must still be
    /// valid, and nothing else may own the blocks.
    pub unsafe fn rollback(&self) -> usize {
        let entries = core::mem::take(&mut *self.entries.borrow_mut());
        for Allocation { slot, block } in entries.iter().rev() {
            // SAFETY: Newer blocks are freed first, so `slot` is still live
            // even when it lies inside an older block.
            unsafe {
                libc::free(block.as_ptr().cast());
                ptr::write_unaligned(slot.as_ptr().cast::<*mut u8>(), ptr::null_mut());
            }
        }
        entries.len()
    }
}
