// -----------------------------------------------------------------------------
// Modules

mod driver;
mod formatter;

mod array_serializer;
mod primitive_serializer;
mod struct_serializer;

// -----------------------------------------------------------------------------
// Exports

pub use driver::{SerializeDriver, to_json_string, value_to_json};
pub use formatter::InlineFormatter;
