//! Reporting: per-entity summary and the workbook layout built around it.
//!
//! The layout is plain data so the placement rules (bold header, chart
//! anchors, column widths) are testable without writing a file.

pub mod layout;
pub mod summary;

pub use layout::*;
pub use summary::*;
