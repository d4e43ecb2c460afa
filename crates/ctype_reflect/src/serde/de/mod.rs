// -----------------------------------------------------------------------------
// Modules

mod driver;
mod journal;

mod array_visitor;
mod pointer_visitor;
mod primitive_visitor;
mod struct_visitor;

// -----------------------------------------------------------------------------
// Exports

pub use driver::{DeserializeDriver, json_to_value};

pub(crate) use journal::Journal;
