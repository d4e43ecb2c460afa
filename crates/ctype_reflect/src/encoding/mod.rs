//! Reading type encodings.
//!
//! An encoding is the compact text a C compiler produces for a type:
//!
//! | Text | Type |
//! |---|---|
//! | `c C s S i I l L q Q` | signed / unsigned integers, `char` to `long long` |
//! | `f d D` | `float`, `double`, `long double` |
//! | `*` | `char *` |
//! | `B` / `v` | `_Bool` / `void` |
//! | `^T` | pointer to `T` (`^?` is an opaque pointer) |
//! | `[N T]` | array of `N` `T` |
//! | `{Name=fields}` / `(Name=fields)` | struct / union |
//! | `r` | `const`, before a type or before a `^` |
//!
//! Each field is a type optionally followed by a field tag,
//! `{$name$line$modifier...=}`, that names it and carries its annotations.
//!
//! ```
//! use ctype_reflect::info::Type;
//!
//! let list = Type::from_encoding(
//!     "{IntList=i{$count$1=}^i{$items$2$sized_by_count=}}",
//! ).unwrap();
//!
//! let items = list.field("items").unwrap();
//! assert_eq!(items.length_field_name(), Some("count"));
//! assert_eq!(items.offset(), size_of::<usize>());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod error;
mod parser;

// -----------------------------------------------------------------------------
// Exports

pub use error::ParseError;
pub use parser::{Parser, parse_type};
