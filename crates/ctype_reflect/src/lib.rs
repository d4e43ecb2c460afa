//! Runtime reflection over C data layouts.
//!
//! A compact type encoding, as emitted by a C compiler's `@encode` extended
//! with field names and annotations, is parsed into a [`Type`](info::Type)
//! tree carrying sizes, alignments, field offsets and a structural hash.
//! Paired with a pointer to memory laid out that way, a type becomes a
//! [`Value`](value::Value) that can be inspected field by field, written as
//! JSON, or filled from JSON.
//!
//! ```
//! use core::ffi::c_int;
//! use ctype_reflect::info::Type;
//! use ctype_reflect::serde::{json_to_value, to_json_string};
//! use ctype_reflect::value::{Value, ValueMut};
//!
//! #[repr(C)]
//! #[derive(Default)]
//! struct Pair { a: c_int, b: c_int }
//!
//! let ty = Type::from_encoding("{CratePair=i{$a$1=}i{$b$2=}}").unwrap();
//!
//! let mut pair = Pair::default();
//! json_to_value(br#"{"b": 2, "a": 1}"#, unsafe { ValueMut::from_mut(&ty, &mut pair) }).unwrap();
//!
//! let json = to_json_string(unsafe { Value::from_ref(&ty, &pair) }).unwrap();
//! assert_eq!(json, r#"{"a": 1, "b": 2}"#);
//! ```
//!
//! # Modules
//!
//! - [`encoding`]: the encoding grammar and its parser.
//! - [`info`]: the type model and its layout.
//! - [`registry`]: the process-wide definition cache for named composites.
//! - [`value`]: typed views of caller memory.
//! - [`serde`]: JSON in both directions.
//! - [`print`]: a debug dump of types.
#![expect(unsafe_code, reason = "Reflected values are raw memory described at runtime.")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod encoding;
pub mod info;
pub mod print;
pub mod registry;
pub mod serde;
pub mod value;
