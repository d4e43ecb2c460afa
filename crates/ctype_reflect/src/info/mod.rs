//! The type model: primitives, pointers, arrays, structs and unions.
//!
//! A [`Type`] is an owned tree. Composite members are [`Field`]s carrying
//! their byte offset and the ordered [`Modifier`] annotations of their field
//! tag. Every `Type` caches a 64-bit structural hash, computed when it is
//! constructed.
//!
//! Types are normally produced by the [encoding parser](crate::encoding),
//! but can be built directly as well:
//!
//! ```
//! use ctype_reflect::info::{Field, Primitive, Type};
//!
//! let point = Type::structure("Point", vec![
//!     Field::named("x", Type::primitive(Primitive::Int)),
//!     Field::named("y", Type::primitive(Primitive::Float)),
//! ]).unwrap();
//!
//! assert_eq!(point.size(), 8);
//! assert_eq!(point.field("y").unwrap().offset(), 4);
//! assert_eq!(point.hash(), Type::from_encoding("{Point=if}").unwrap().hash());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod encode;
mod field;
mod hash;
mod layout;
mod modifier;
mod primitive;
mod type_info;
mod validate;

// -----------------------------------------------------------------------------
// Exports

pub use composite::{CompositeInfo, CompositeKind};
pub use encode::Encode;
pub use field::Field;
pub use hash::hash_bytes;
pub use modifier::{Modifier, TypeModifiers};
pub use primitive::Primitive;
pub use type_info::{ArrayInfo, Type, TypeKind};
pub use validate::{AnnotationError, DefinitionError};

pub(crate) use layout::layout_fields;
