//! Tolerant comparison of computed features.
//!
//! Features computed by different tools never match bit for bit, so
//! equality goes through a [`ClosenessOracle`]: sequences must correlate
//! highly and scalars must agree within a tolerance. A [`ComparisonPolicy`]
//! picks which checks apply, and a [`Comparator`] bundles both with the
//! thresholds from [`PathConfig`].
//!
//! Comparisons never fail; they return `false` and log the attribute that
//! differed.
//!
//! # Example
//!
//! ```
//! use worm_path::{Comparator, FeatureCompare, PathConfig, Range};
//!
//! let a = Range { value: vec![0.0, 1.0, 2.0, f64::NAN] };
//! let b = Range { value: vec![0.0, 1.1, 2.1, 3.0] };
//!
//! let comparator = Comparator::from_config(&PathConfig::default());
//! assert!(a.matches(&b, &comparator));
//! ```

use tracing::warn;

use crate::arena::Arena;
use crate::config::{Compatibility, PathConfig};
use crate::duration::{Duration, DurationElement};
use crate::math::stats::nan_pearson;
use crate::range::Range;

/// Numerical closeness checks used by feature comparisons.
pub trait ClosenessOracle {
    /// Whether two sequences correlate above `threshold`.
    fn corr_value_high(&self, a: &[f64], b: &[f64], label: &str, threshold: f64) -> bool;

    /// Whether two scalars agree within `tolerance`.
    fn fp_isequal(&self, a: f64, b: f64, label: &str, tolerance: f64) -> bool;
}

/// Pearson-correlation oracle.
///
/// Sequences of different lengths differ. Identical sequences (NaN in the
/// same places) are equal, including empty and constant ones. Otherwise
/// NaN pairs are dropped and the correlation must exceed the threshold.
/// Two NaN scalars are equal; one NaN scalar is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationOracle;

impl ClosenessOracle for CorrelationOracle {
    fn corr_value_high(&self, a: &[f64], b: &[f64], label: &str, threshold: f64) -> bool {
        if a.len() != b.len() {
            warn!(label, len_a = a.len(), len_b = b.len(), "sequence lengths differ");
            return false;
        }
        let identical = a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()));
        if identical {
            return true;
        }

        let corr = nan_pearson(a, b);
        let is_good = corr > threshold;
        if !is_good {
            warn!(label, corr, threshold, "sequences not correlated");
        }
        is_good
    }

    fn fp_isequal(&self, a: f64, b: f64, label: &str, tolerance: f64) -> bool {
        let is_equal = match (a.is_nan(), b.is_nan()) {
            (true, true) => true,
            (false, false) => (a - b).abs() <= tolerance,
            _ => false,
        };
        if !is_equal {
            warn!(label, a, b, tolerance, "values not equal");
        }
        is_equal
    }
}

/// Which checks a comparison applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonPolicy {
    /// Compare every attribute through the oracle.
    #[default]
    Tolerant,
    /// Durations always compare equal. Occupancy indices depend on rounding
    /// conventions that the older tools do not share.
    Legacy,
}

impl From<Compatibility> for ComparisonPolicy {
    fn from(compatibility: Compatibility) -> Self {
        match compatibility {
            Compatibility::Standard => Self::Tolerant,
            Compatibility::Legacy => Self::Legacy,
        }
    }
}

/// Policy, oracle and thresholds for comparing features.
#[derive(Debug, Clone)]
pub struct Comparator<O = CorrelationOracle> {
    /// Which checks apply.
    pub policy: ComparisonPolicy,
    /// Closeness checks.
    pub oracle: O,
    /// Correlation a sequence pair must exceed.
    pub correlation_threshold: f64,
    /// Scalar tolerance.
    pub fp_tolerance: f64,
    /// Arena height/width tolerance.
    pub arena_size_tolerance: f64,
}

impl Comparator<CorrelationOracle> {
    /// Comparator with the correlation oracle and thresholds from `config`.
    #[must_use]
    pub fn from_config(config: &PathConfig) -> Self {
        Self::with_oracle(config, CorrelationOracle)
    }
}

impl<O: ClosenessOracle> Comparator<O> {
    /// Comparator with a custom oracle and thresholds from `config`.
    #[must_use]
    pub fn with_oracle(config: &PathConfig, oracle: O) -> Self {
        Self {
            policy: config.compatibility.into(),
            oracle,
            correlation_threshold: config.correlation_threshold,
            fp_tolerance: config.fp_tolerance,
            arena_size_tolerance: config.arena_size_tolerance,
        }
    }

    /// Override the policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ComparisonPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn sequences(&self, a: &[f64], b: &[f64], label: &str) -> bool {
        self.oracle
            .corr_value_high(a, b, label, self.correlation_threshold)
    }

    fn scalars(&self, a: f64, b: f64, label: &str, tolerance: f64) -> bool {
        self.oracle.fp_isequal(a, b, label, tolerance)
    }
}

/// Equality under a [`Comparator`].
pub trait FeatureCompare {
    /// Whether `self` and `other` agree under `comparator`.
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool;
}

impl FeatureCompare for Range {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        comparator.sequences(&self.value, &other.value, "path.range")
    }
}

impl FeatureCompare for Arena {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        let size_tol = comparator.arena_size_tolerance;
        let tol = comparator.fp_tolerance;
        comparator.scalars(self.height, other.height, "Arena.height", size_tol)
            && comparator.scalars(self.width, other.width, "Arena.width", size_tol)
            && comparator.scalars(self.min_x, other.min_x, "Arena.min_x", tol)
            && comparator.scalars(self.min_y, other.min_y, "Arena.min_y", tol)
            && comparator.scalars(self.max_x, other.max_x, "Arena.max_x", tol)
            && comparator.scalars(self.max_y, other.max_y, "Arena.max_y", tol)
    }
}

impl FeatureCompare for DurationElement {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        let as_f64 = |indices: &[usize]| -> Vec<f64> { indices.iter().map(|&i| i as f64).collect() };
        comparator.sequences(
            &as_f64(&self.indices),
            &as_f64(&other.indices),
            "Duration.indices",
        ) && comparator.sequences(&self.times, &other.times, "Duration.times")
    }
}

impl FeatureCompare for Duration {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        match comparator.policy {
            ComparisonPolicy::Legacy => true,
            ComparisonPolicy::Tolerant => {
                self.arena.matches(&other.arena, comparator)
                    && self.worm.matches(&other.worm, comparator)
                    && self.head.matches(&other.head, comparator)
                    && self.midbody.matches(&other.midbody, comparator)
                    && self.tail.matches(&other.tail, comparator)
            }
        }
    }
}
