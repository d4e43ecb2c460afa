//! Small shared utilities: fixed-seed hash containers and integer helpers
//! used by layout computation and annotation parsing.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod num;
