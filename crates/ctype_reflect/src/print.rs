//! A debug dump of the type model.
//!
//! Primitives print as their encoding byte, composites as their name and
//! size followed by one `(+offset) name: type` line per field, arrays as
//! `[len]` and pointers as `*` in front of the element type.
//!
//! ```
//! use ctype_reflect::info::Type;
//!
//! let ty = Type::from_encoding("{PrintPoint=i{$x$1=}^ri{$y$2=}}").unwrap();
//! assert_eq!(
//!     ty.to_string(),
//!     "PrintPoint (size: 16)  {\n    (+0) x: i\n    (+8) y: *const i\n}\n",
//! );
//! ```

use alloc::string::String;
use core::fmt::{self, Write};
use std::io;

use crate::info::{Type, TypeKind};

/// Writes the debug dump of `ty` to `writer`, with nested fields indented
/// by `indent + 4` spaces.
pub fn print_type<W: io::Write>(mut writer: W, ty: &Type, indent: usize) -> io::Result<()> {
    let mut text = String::new();
    // Writing to a `String` cannot fail.
    let _ = write_type(&mut text, ty, indent);
    writer.write_all(text.as_bytes())
}

fn write_type(out: &mut impl Write, ty: &Type, indent: usize) -> fmt::Result {
    if ty.is_const() {
        out.write_str("const ")?;
    }
    match ty.kind() {
        TypeKind::Primitive(primitive) => writeln!(out, "{}", char::from(primitive.encoding())),
        TypeKind::Struct(info) | TypeKind::Union(info) => {
            if matches!(ty.kind(), TypeKind::Union(_)) {
                out.write_str("union ")?;
            }
            write!(out, "{} (size: {}) ", info.name(), ty.size())?;
            if !info.is_forward() {
                out.write_str(" {\n")?;
                for field in info.iter() {
                    let name = field.name().unwrap_or("?");
                    write!(out, "{:w$}(+{}) {name}: ", "", field.offset(), w = indent + 4)?;
                    write_type(out, field.ty(), indent + 4)?;
                }
                write!(out, "{:indent$}}}", "")?;
            }
            out.write_char('\n')
        }
        TypeKind::Array(array) => {
            write!(out, "[{}]", array.len())?;
            write_type(out, array.item(), indent)
        }
        TypeKind::Pointer(pointee) => {
            out.write_char('*')?;
            write_type(out, pointee, indent + 4)
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self, 0)
    }
}
