//! Runtime reflection over C data layouts: parse a compact type encoding,
//! compute its layout, and convert memory described by it to and from JSON.
//!
//! See [`reflect`] for the entry points.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use ctype_ptr as ptr;
pub use ctype_reflect as reflect;
pub use ctype_utils as utils;
