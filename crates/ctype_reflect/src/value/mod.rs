//! Reflected views of caller-owned memory.
//!
//! A [`Value`] pairs a [`Type`](crate::info::Type) with a pointer to memory
//! laid out as that type; [`ValueMut`] is the writable form used as the
//! target of a JSON ingest.

// -----------------------------------------------------------------------------
// Modules

mod release;
mod view;

pub(crate) mod long_double;
pub(crate) mod scalar;
pub(crate) mod tag;

// -----------------------------------------------------------------------------
// Exports

pub use release::{release_value, release_value_with};
pub use view::{AccessError, Value, ValueMut};
