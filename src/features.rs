//! All path features of one recording.

use nalgebra::DMatrix;
use tracing::debug;

use crate::compare::{ClosenessOracle, Comparator, FeatureCompare};
use crate::config::{PathConfig, VentralMode};
use crate::curvature::PathCurvature;
use crate::duration::Duration;
use crate::error::Result;
use crate::range::Range;
use crate::skeleton::{PartitionTable, SkeletonTrajectory};
use crate::velocity::VelocityEstimator;

/// Range, duration and curvature of a worm's path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFeatures {
    /// Distance from the path centroid per frame.
    pub range: Range,
    /// Arena and per-region occupancy time.
    pub duration: Duration,
    /// Path curvature per frame.
    pub curvature: PathCurvature,
}

/// Compute every path feature of a recording.
///
/// # Arguments
///
/// * `skeleton` - Skeleton coordinates, `(points, frames)`, at least 45 points
/// * `widths` - Body widths, same shape as the skeleton
/// * `partitions` - Body partitions (see [`PartitionTable::standard`])
/// * `fps` - Video frame rate
/// * `ventral_mode` - Ventral side annotation
/// * `config` - Path configuration
/// * `estimator` - Velocity estimator for curvature
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any feature fails;
/// an all-NaN skeleton fails with [`crate::PathError::DegenerateInput`].
pub fn compute_path_features<V: VelocityEstimator + ?Sized>(
    skeleton: &SkeletonTrajectory,
    widths: &DMatrix<f64>,
    partitions: &PartitionTable,
    fps: f64,
    ventral_mode: VentralMode,
    config: &PathConfig,
    estimator: &V,
) -> Result<PathFeatures> {
    config.validate()?;

    let range = Range::compute(skeleton);
    let duration = Duration::compute(skeleton, widths, partitions, fps, config)?;
    let curvature = PathCurvature::compute(skeleton, fps, ventral_mode, config, estimator)?;

    debug!(
        n_frames = skeleton.n_frames(),
        arena_height = duration.arena.height,
        arena_width = duration.arena.width,
        "computed path features"
    );

    Ok(PathFeatures {
        range,
        duration,
        curvature,
    })
}

impl FeatureCompare for PathCurvature {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        comparator
            .oracle
            .corr_value_high(&self.value, &other.value, "path.curvature", comparator.correlation_threshold)
    }
}

impl FeatureCompare for PathFeatures {
    fn matches<O: ClosenessOracle>(&self, other: &Self, comparator: &Comparator<O>) -> bool {
        self.range.matches(&other.range, comparator)
            && self.duration.matches(&other.duration, comparator)
            && self.curvature.matches(&other.curvature, comparator)
    }
}

#[cfg(feature = "serde")]
mod records {
    use super::PathFeatures;
    use crate::curvature::PathCurvature;
    use crate::duration::Duration;
    use crate::error::Result;
    use crate::persist::PathRecord;
    use crate::range::Range;

    impl PathFeatures {
        /// Rebuild from a stored record. A missing curvature loads as empty.
        ///
        /// # Errors
        ///
        /// Returns an error if any part of the record is malformed.
        pub fn from_record(record: &PathRecord) -> Result<Self> {
            let curvature = match &record.curvature {
                Some(values) => values.to_values()?,
                None => Vec::new(),
            };
            Ok(Self {
                range: Range::from_record(&record.range)?,
                duration: Duration::from_record(&record.duration)?,
                curvature: PathCurvature { value: curvature },
            })
        }

        /// Store as a record.
        #[must_use]
        pub fn to_record(&self) -> PathRecord {
            PathRecord {
                range: self.range.to_record(),
                duration: self.duration.to_record(),
                curvature: Some(crate::persist::Numeric::from_values(&self.curvature.value)),
            }
        }
    }
}
