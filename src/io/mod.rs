//! Output helpers.
//!
//! - workbook persistence (`workbook`)

pub mod workbook;

pub use workbook::*;
