//! Configuration for path feature computation.
//!
//! [`PathConfig`] carries the settings that older tooling kept as
//! process-wide flags: the legacy-compatibility switch and the curvature
//! frame window. It is passed explicitly to every entry point.
//!
//! # Example
//!
//! ```
//! use worm_path::{Compatibility, PathConfig};
//!
//! let config = PathConfig::default();
//! assert_eq!(config.compatibility, Compatibility::Standard);
//!
//! let legacy = PathConfig::legacy().with_body_diff(0.25);
//! assert!(legacy.validate().is_ok());
//! ```

use crate::error::{PathError, Result};

/// Settings shared by range, duration and curvature computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PathConfig {
    /// Which numeric conventions to follow.
    pub compatibility: Compatibility,

    /// Time span (seconds) of the velocity window used for path curvature.
    pub body_diff: f64,

    /// Curvature distances below this are treated as undefined.
    pub min_distance: f64,

    /// Correlation a sequence pair must exceed to compare equal.
    pub correlation_threshold: f64,

    /// Absolute tolerance for scalar comparisons.
    pub fp_tolerance: f64,

    /// Absolute tolerance for arena height/width comparisons.
    /// Rounding conventions differ between numeric tools by one cell.
    pub arena_size_tolerance: f64,

    /// Rasterize the body regions on the rayon pool.
    pub parallel_regions: bool,
}

/// Numeric convention selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compatibility {
    /// NaN-aware conventions throughout.
    #[default]
    Standard,
    /// Reproduce the older pipeline where its numbers differ.
    Legacy,
}

impl Compatibility {
    /// The mean body width formula this mode uses for arena scaling.
    #[must_use]
    pub const fn mean_width_policy(self) -> MeanWidthPolicy {
        match self {
            Self::Standard => MeanWidthPolicy::NanMean,
            Self::Legacy => MeanWidthPolicy::PerRegionAverage,
        }
    }

    /// Whether this is the legacy mode.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// How a single representative body width is derived from the width array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanWidthPolicy {
    /// NaN-ignoring mean over every width sample.
    NanMean,
    /// Unweighted mean of the head, midbody and tail NaN-means.
    PerRegionAverage,
}

/// Side of the worm that faces the plate, as annotated by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VentralMode {
    /// Not annotated.
    #[default]
    Unknown,
    /// Ventral side is clockwise from the head.
    Clockwise,
    /// Ventral side is anticlockwise from the head; angular speed is negated.
    Anticlockwise,
}

impl VentralMode {
    /// Map the tracker's integer code (0, 1, 2).
    ///
    /// # Errors
    ///
    /// Returns an error for any other code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Clockwise),
            2 => Ok(Self::Anticlockwise),
            other => Err(PathError::invalid_input(format!(
                "unknown ventral mode code {other}"
            ))),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            compatibility: Compatibility::Standard,
            body_diff: 0.5,
            min_distance: 1.0,
            correlation_threshold: 0.99,
            fp_tolerance: 1e-6,
            arena_size_tolerance: 1.0,
            parallel_regions: true,
        }
    }
}

impl PathConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.body_diff) {
            return Err(PathError::invalid_config("body_diff must be positive"));
        }
        if !is_positive(self.min_distance) {
            return Err(PathError::invalid_config("min_distance must be positive"));
        }
        if !(-1.0..=1.0).contains(&self.correlation_threshold) {
            return Err(PathError::invalid_config(
                "correlation_threshold must lie in [-1, 1]",
            ));
        }
        if !is_non_negative(self.fp_tolerance) || !is_non_negative(self.arena_size_tolerance) {
            return Err(PathError::invalid_config("tolerances must be non-negative"));
        }
        Ok(())
    }

    /// Preset reproducing the older pipeline.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            compatibility: Compatibility::Legacy,
            ..Self::default()
        }
    }

    /// Preset with standard conventions (same as `default()`).
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Set the compatibility mode.
    #[must_use]
    pub const fn with_compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Set the curvature velocity window in seconds.
    #[must_use]
    pub const fn with_body_diff(mut self, seconds: f64) -> Self {
        self.body_diff = seconds;
        self
    }

    /// Set the correlation threshold used by sequence comparisons.
    #[must_use]
    pub const fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    /// Enable/disable parallel per-region rasterization.
    #[must_use]
    pub const fn with_parallel_regions(mut self, parallel: bool) -> Self {
        self.parallel_regions = parallel;
        self
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
