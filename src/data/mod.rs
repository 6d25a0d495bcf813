//! Data retrieval and normalization.
//!
//! - SDMX client + message parsing (`sdmx`)
//! - raw table -> flat long-form rows (`normalize`)

pub mod normalize;
pub mod sdmx;

pub use normalize::normalize;
pub use sdmx::{ObservationSource, SdmxClient};
