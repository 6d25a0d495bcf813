//! Long <-> wide reshaping.
//!
//! `pivot` turns normalized observations into the wide table the summary and
//! charts work on; `unpivot` is its inverse and exists mostly so the shape
//! guarantees can be checked.

pub mod pivot;

pub use pivot::*;
