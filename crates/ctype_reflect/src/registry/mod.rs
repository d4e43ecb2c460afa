//! The definition cache for named composites.

// -----------------------------------------------------------------------------
// Modules

mod type_cache;

// -----------------------------------------------------------------------------
// Exports

pub use type_cache::{Resolved, TypeCache};
