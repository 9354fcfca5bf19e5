//! Load series types and normalization onto the hourly grid.

pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::{Observation, RawObservation, TimeSeries};
