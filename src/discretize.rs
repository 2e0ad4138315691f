//! Scaling and discretization of skeleton coordinates onto the arena grid.
//!
//! Coordinates are scaled so that one grid cell spans a fixed fraction of
//! the worm's mean body width, rounded to integers, and translated so the
//! smallest occupied cell sits at index 0 on each axis.
//!
//! Rounding uses [`f64::round`], Rust's native convention (ties away from
//! zero). Tools that round ties to even may place a half-cell sample one
//! cell over, which is why arena sizes are compared with a one-cell
//! tolerance.

use nalgebra::DMatrix;
use tracing::debug;

use crate::config::MeanWidthPolicy;
use crate::error::{PathError, Result};
use crate::math::stats::{mean, nan_max, nan_mean, nan_min};
use crate::skeleton::{PartitionTable, SkeletonTrajectory};

/// Bounds of the valid scaled coordinates, before translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledBounds {
    /// Smallest scaled x.
    pub x_min: f64,
    /// Largest scaled x.
    pub x_max: f64,
    /// Smallest scaled y.
    pub y_min: f64,
    /// Largest scaled y.
    pub y_max: f64,
}

impl ScaledBounds {
    /// Grid shape `(height, width)` spanned by the bounds.
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize) {
        let height = self.y_max - self.y_min + 1.0;
        let width = self.x_max - self.x_min + 1.0;
        (height as usize, width as usize)
    }
}

/// Skeleton samples mapped to arena grid cells.
///
/// `rows`/`cols` hold the translated y/x indices. Entries where `valid` is
/// false carry a placeholder 0 and must not be used as indices.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizedSkeleton {
    /// Scale factor applied to the raw coordinates.
    pub scale: f64,
    /// Scaled, rounded x coordinates (NaN where missing).
    pub scaled_x: DMatrix<f64>,
    /// Scaled, rounded y coordinates (NaN where missing).
    pub scaled_y: DMatrix<f64>,
    /// Bounds of `scaled_x`/`scaled_y`.
    pub bounds: ScaledBounds,
    /// Grid row (y) index per sample.
    pub rows: DMatrix<usize>,
    /// Grid column (x) index per sample.
    pub cols: DMatrix<usize>,
    /// Whether a sample was present.
    pub valid: DMatrix<bool>,
}

impl DiscretizedSkeleton {
    /// Grid shape `(height, width)`.
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize) {
        self.bounds.grid_shape()
    }

    /// Frames with at least one valid sample, in order.
    #[must_use]
    pub fn frames_with_data(&self) -> Vec<usize> {
        self.valid
            .column_iter()
            .enumerate()
            .filter(|(_, column)| column.iter().any(|&v| v))
            .map(|(frame, _)| frame)
            .collect()
    }
}

impl MeanWidthPolicy {
    /// Representative body width under this policy.
    ///
    /// `widths` is `(points, frames)` like the skeleton. The per-region
    /// policy uses the `head`, `midbody` and `tail` partitions.
    ///
    /// # Errors
    ///
    /// Returns an error if a required partition is missing or out of bounds.
    pub fn mean_width(self, widths: &DMatrix<f64>, partitions: &PartitionTable) -> Result<f64> {
        match self {
            Self::NanMean => Ok(nan_mean(widths.iter())),
            Self::PerRegionAverage => {
                let mut region_means = Vec::with_capacity(3);
                for name in ["head", "midbody", "tail"] {
                    let part = partitions.require(name, widths.nrows())?;
                    let rows = widths.rows(part.start, part.len());
                    region_means.push(nan_mean(rows.iter()));
                }
                Ok(mean(&region_means))
            }
        }
    }
}

/// Scale factor mapping raw coordinates to arena cells.
#[inline]
#[must_use]
pub fn arena_scale(mean_width: f64) -> f64 {
    std::f64::consts::SQRT_2 / mean_width
}

/// Largest arena, in cells, a trajectory may span.
pub const MAX_ARENA_CELLS: usize = 1 << 26;

fn check_arena_size(bounds: &ScaledBounds) -> Result<()> {
    let height = bounds.y_max - bounds.y_min + 1.0;
    let width = bounds.x_max - bounds.x_min + 1.0;
    let limit = MAX_ARENA_CELLS as f64;
    let cells = (height <= limit && width <= limit)
        .then(|| (height as usize).checked_mul(width as usize))
        .flatten()
        .filter(|&cells| cells <= MAX_ARENA_CELLS);
    match cells {
        Some(_) => Ok(()),
        None => Err(PathError::invalid_input(format!(
            "arena of {height}x{width} cells exceeds {MAX_ARENA_CELLS} cells"
        ))),
    }
}

/// Scale, round and translate a trajectory onto the arena grid.
///
/// # Errors
///
/// Returns [`PathError::DegenerateInput`] when the trajectory is empty,
/// entirely NaN or holds infinite coordinates, or when the scale is
/// undefined (mean width NaN, zero or negative). Returns
/// [`PathError::InvalidInput`] when the arena would exceed
/// [`MAX_ARENA_CELLS`].
pub fn discretize(skeleton: &SkeletonTrajectory, mean_width: f64) -> Result<DiscretizedSkeleton> {
    if skeleton.is_degenerate() {
        return Err(PathError::degenerate(
            "skeleton has no valid coordinates; cannot build an arena",
        ));
    }

    let scale = arena_scale(mean_width);
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PathError::degenerate(format!(
            "mean body width {mean_width} gives no usable arena scale"
        )));
    }

    let scaled_x = skeleton.x().map(|v| (v * scale).round());
    let scaled_y = skeleton.y().map(|v| (v * scale).round());

    // Mask before any integer conversion
    let valid = scaled_x.zip_map(&scaled_y, |x, y| !x.is_nan() && !y.is_nan());
    if !valid.iter().any(|&v| v) {
        return Err(PathError::degenerate(
            "no sample has both x and y coordinates",
        ));
    }

    if scaled_x.iter().chain(scaled_y.iter()).any(|v| v.is_infinite()) {
        return Err(PathError::degenerate(
            "skeleton has infinite coordinates; cannot build an arena",
        ));
    }

    let bounds = ScaledBounds {
        x_min: nan_min(scaled_x.iter()),
        x_max: nan_max(scaled_x.iter()),
        y_min: nan_min(scaled_y.iter()),
        y_max: nan_max(scaled_y.iter()),
    };
    check_arena_size(&bounds)?;

    let to_index = |scaled: &DMatrix<f64>, min: f64| {
        DMatrix::from_fn(scaled.nrows(), scaled.ncols(), |r, c| {
            if valid[(r, c)] {
                (scaled[(r, c)] - min) as usize
            } else {
                0
            }
        })
    };
    let cols = to_index(&scaled_x, bounds.x_min);
    let rows = to_index(&scaled_y, bounds.y_min);

    debug!(
        scale,
        height = bounds.grid_shape().0,
        width = bounds.grid_shape().1,
        "discretized skeleton onto arena grid"
    );

    Ok(DiscretizedSkeleton {
        scale,
        scaled_x,
        scaled_y,
        bounds,
        rows,
        cols,
        valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BodyPartition;
    use approx::assert_relative_eq;

    fn two_by_two() -> SkeletonTrajectory {
        SkeletonTrajectory::from_rows(
            &[vec![0.0, 2.0], vec![0.0, 2.0]],
            &[vec![0.0, 0.0], vec![0.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_unit_scale_keeps_coordinates() {
        let disc = discretize(&two_by_two(), std::f64::consts::SQRT_2).unwrap();
        assert_relative_eq!(disc.scale, 1.0, epsilon = 1e-12);
        assert_eq!(disc.scaled_x[(0, 1)], 2.0);
        assert_eq!(disc.bounds.x_min, 0.0);
        assert_eq!(disc.bounds.x_max, 2.0);
        assert_eq!(disc.bounds.y_max, 0.0);
        assert_eq!(disc.grid_shape(), (1, 3));
        assert_eq!(disc.cols[(1, 1)], 2);
        assert_eq!(disc.rows[(1, 1)], 0);
    }

    #[test]
    fn test_translation_to_zero() {
        let skel = SkeletonTrajectory::from_rows(
            &[vec![10.0, 12.0, f64::NAN]],
            &[vec![-3.0, -1.0, f64::NAN]],
        )
        .unwrap();
        let disc = discretize(&skel, std::f64::consts::SQRT_2).unwrap();
        assert_eq!(disc.cols[(0, 0)], 0);
        assert_eq!(disc.cols[(0, 1)], 2);
        assert_eq!(disc.rows[(0, 1)], 2);
        assert!(!disc.valid[(0, 2)]);
        assert_eq!(disc.frames_with_data(), vec![0, 1]);
    }

    #[test]
    fn test_rounding_ties_away_from_zero() {
        // scale 2: 1.25 -> 2.5 -> 3, -1.25 -> -2.5 -> -3
        let skel =
            SkeletonTrajectory::from_rows(&[vec![1.25, -1.25]], &[vec![0.0, 0.0]]).unwrap();
        let disc = discretize(&skel, std::f64::consts::SQRT_2 / 2.0).unwrap();
        assert_eq!(disc.scaled_x[(0, 0)], 3.0);
        assert_eq!(disc.scaled_x[(0, 1)], -3.0);
        assert_eq!(disc.grid_shape(), (1, 7));
    }

    #[test]
    fn test_all_nan_is_degenerate() {
        let nan = DMatrix::from_element(3, 4, f64::NAN);
        let skel = SkeletonTrajectory::new(nan.clone(), nan).unwrap();
        assert!(matches!(
            discretize(&skel, 1.0),
            Err(PathError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_infinite_coordinate_is_degenerate() {
        let skel =
            SkeletonTrajectory::from_rows(&[vec![0.0, f64::INFINITY]], &[vec![0.0, 0.0]]).unwrap();
        assert!(matches!(
            discretize(&skel, 1.0),
            Err(PathError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_oversized_arena_rejected() {
        let skel = SkeletonTrajectory::from_rows(&[vec![0.0, 1e12]], &[vec![0.0, 1e12]]).unwrap();
        assert!(matches!(
            discretize(&skel, 1.0),
            Err(PathError::InvalidInput(_))
        ));

        // A long thin arena overflows the cell limit without overflowing usize
        let skel = SkeletonTrajectory::from_rows(&[vec![0.0, 1e9]], &[vec![0.0, 0.0]]).unwrap();
        assert!(discretize(&skel, std::f64::consts::SQRT_2).is_err());
    }

    #[test]
    fn test_undefined_width_is_degenerate() {
        assert!(discretize(&two_by_two(), f64::NAN).is_err());
        assert!(discretize(&two_by_two(), 0.0).is_err());
    }

    #[test]
    fn test_mean_width_policies() {
        let partitions = PartitionTable::empty()
            .with("head", BodyPartition::new(0, 1))
            .with("midbody", BodyPartition::new(1, 3))
            .with("tail", BodyPartition::new(3, 4));
        let widths = DMatrix::from_row_slice(
            4,
            2,
            &[
                1.0, 1.0, //
                2.0, f64::NAN, //
                2.0, 2.0, //
                6.0, 6.0,
            ],
        );

        let standard = MeanWidthPolicy::NanMean.mean_width(&widths, &partitions).unwrap();
        assert_relative_eq!(standard, 20.0 / 7.0, epsilon = 1e-12);

        let legacy = MeanWidthPolicy::PerRegionAverage
            .mean_width(&widths, &partitions)
            .unwrap();
        assert_relative_eq!(legacy, 3.0, epsilon = 1e-12);

        assert!(MeanWidthPolicy::PerRegionAverage
            .mean_width(&widths, &PartitionTable::empty())
            .is_err());
    }
}
