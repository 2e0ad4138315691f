//! Numeric helpers shared by the path features.
//!
//! - [`stats`]: NaN-aware reductions and correlation
//! - [`angle`]: degree wrapping

pub mod angle;
pub mod stats;

pub use angle::{atan2_degrees, wrap_degrees};
pub use stats::{mean, nan_max, nan_mean, nan_min, nan_pearson};
