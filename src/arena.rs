//! The arena: extent of the occupancy grid a worm explored.

use crate::discretize::DiscretizedSkeleton;
use crate::math::stats::{nan_max, nan_min};
use crate::skeleton::SkeletonTrajectory;

/// Grid size and coordinate bounds of a worm's explored area.
///
/// `height`/`width` count grid cells. The min/max bounds are in raw
/// (unscaled) skeleton coordinates. All fields are NaN for a null arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    /// Number of grid rows.
    pub height: f64,
    /// Number of grid columns.
    pub width: f64,
    /// Smallest raw x coordinate.
    pub min_x: f64,
    /// Smallest raw y coordinate.
    pub min_y: f64,
    /// Largest raw x coordinate.
    pub max_x: f64,
    /// Largest raw y coordinate.
    pub max_y: f64,
}

impl Arena {
    /// Arena of a discretized trajectory.
    #[must_use]
    pub fn from_discretized(skeleton: &SkeletonTrajectory, disc: &DiscretizedSkeleton) -> Self {
        let (height, width) = disc.grid_shape();
        Self {
            height: height as f64,
            width: width as f64,
            min_x: nan_min(skeleton.x().iter()),
            min_y: nan_min(skeleton.y().iter()),
            max_x: nan_max(skeleton.x().iter()),
            max_y: nan_max(skeleton.y().iter()),
        }
    }

    /// The arena of a trajectory without data.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            height: f64::NAN,
            width: f64::NAN,
            min_x: f64::NAN,
            min_y: f64::NAN,
            max_x: f64::NAN,
            max_y: f64::NAN,
        }
    }

    /// Whether this is a null arena.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.height.is_nan() && self.width.is_nan()
    }

    /// Grid shape `(height, width)`, or `None` for a null arena.
    #[must_use]
    pub fn grid_shape(&self) -> Option<(usize, usize)> {
        if self.height.is_finite() && self.width.is_finite() && self.height >= 0.0 && self.width >= 0.0 {
            Some((self.height as usize, self.width as usize))
        } else {
            None
        }
    }
}
