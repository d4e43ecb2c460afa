//! Untyped pointers that keep a borrow lifetime.
//!
//! A reflected value is a parsed type plus an address whose layout only that
//! type knows. [`Ptr`] and [`PtrMut`] stand in for `&T` and `&mut T` there:
//! they carry the lifetime of the borrowed memory, move by byte offsets, and
//! read or write scalars without assuming alignment.
#![expect(unsafe_code, reason = "Untyped memory access needs raw pointers.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod type_erased;

// -----------------------------------------------------------------------------
// Exports

pub use type_erased::{Ptr, PtrMut};
