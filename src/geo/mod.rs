//! Geographic support for map axes: projections, longitude wrapping and
//! land/coastline features.

mod features;
mod projection;

pub use features::{FeatureSet, Ring};
pub use projection::{wrap_shifts, Projection};
