//! Error types for path feature computation.
//!
//! Missing samples are not errors here: they travel through the features as
//! NaN. The variants below cover inputs no feature can be built from.

use thiserror::Error;

/// Main error type for path feature operations.
#[derive(Error, Debug)]
pub enum PathError {
    /// Every coordinate is missing (or there are none), so no arena exists.
    #[error("Unsupported degenerate input: {context}")]
    DegenerateInput { context: String },

    /// Two arrays that must share a (points, frames) shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A body partition reaches past the skeleton.
    #[error("Partition `{region}` [{start}, {end}) out of bounds for {n_points} points")]
    PartitionOutOfBounds {
        region: String,
        start: usize,
        end: usize,
        n_points: usize,
    },

    /// Skeleton has fewer body points than the computation needs.
    #[error("Too few body points: need at least {min}, got {actual}")]
    TooFewPoints { min: usize, actual: usize },

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A persisted record could not be parsed.
    #[cfg(feature = "serde")]
    #[error("Persisted record error: {0}")]
    Persist(#[from] serde_json::Error),
}

/// Result type alias for path feature operations.
pub type Result<T> = std::result::Result<T, PathError>;

impl PathError {
    /// Create a degenerate input error.
    #[must_use]
    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateInput {
            context: context.into(),
        }
    }

    /// Create a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create a too-few-points error.
    #[must_use]
    pub const fn too_few_points(min: usize, actual: usize) -> Self {
        Self::TooFewPoints { min, actual }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
