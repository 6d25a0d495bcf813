//! Report charts.
//!
//! - chart descriptions from the wide table (`charts`)
//! - PNG rendering through Plotters (`render`)

pub mod charts;
pub mod render;

pub use charts::*;
pub use render::*;
