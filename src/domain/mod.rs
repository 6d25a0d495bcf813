//! Domain types used throughout the pipeline.
//!
//! - query + configuration (`Query`, `ReportConfig`, `DuplicatePolicy`)
//! - table shapes per stage (`RawTable`, `FlatRow`, `WideTable`, `SummaryTable`)
//! - static display-name tables (`labels`)

pub mod labels;
pub mod types;

pub use types::*;
