//! JSON conversion of reflected values.
//!
//! Both directions are driven by a value's [`Type`](crate::info::Type), so
//! no serde traits need to be implemented for the data itself.
//!
//! # Overview
//!
//! ## Serialization
//!
//! - [`SerializeDriver`]: implements `Serialize` for a [`Value`], so any
//!   serde format can write it. Its [`write_json`](SerializeDriver::write_json)
//!   produces the single-line layout of [`InlineFormatter`].
//! - [`value_to_json`] and [`to_json_string`]: shorthands over the driver.
//!
//! ## Deserialization
//!
//! - [`DeserializeDriver`]: implements `DeserializeSeed`, filling a
//!   [`ValueMut`] in place from any serde format. Its
//!   [`from_slice`](DeserializeDriver::from_slice) reads JSON and undoes
//!   every allocation when the document is rejected.
//! - [`json_to_value`]: shorthand over the driver.
//!
//! ## Field annotations
//!
//! | Annotation | Effect |
//! |---|---|
//! | `serialise_as_<KEY>` | JSON key used in both directions |
//! | `no_serialise` | left out of the output |
//! | `no_deserialise` | ignored in the input, never required |
//! | `optional` | may be absent from the input |
//! | `sized_by_<NAME>`, `sizedby <NAME>` | `char *` or pointer holding as many elements as field `NAME` |
//! | `tagged_by_<NAME>` | union whose active arm is selected by field `NAME` |
//! | `tag_value_<VALUE>` | on a union arm, the tag value selecting it |
//!
//! ## Errors
//!
//! Failures are reported as a [`JsonError`]. Its [`code`](JsonError::code)
//! is a distinct negative number per [`JsonErrorKind`], and with the `debug`
//! feature its [`path`](JsonError::path) tells where the failure happened.
//!
//! [`Value`]: crate::value::Value
//! [`ValueMut`]: crate::value::ValueMut

// -----------------------------------------------------------------------------
// Modules

mod context;
mod de;
mod error;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::{DeserializeDriver, json_to_value};
pub use error::{JsonError, JsonErrorKind};
pub use ser::{InlineFormatter, SerializeDriver, to_json_string, value_to_json};
