//! Path duration: how long each body region spent in each arena cell.
//!
//! # Pipeline
//!
//! 1. Pick a mean body width and scale the skeleton onto the arena grid
//! 2. Rasterize the worm, head, midbody and tail occupancy
//! 3. Convert each grid into sparse `(index, seconds)` pairs
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use worm_path::{
//!     BodyPartition, Duration, PartitionTable, PathConfig, SkeletonTrajectory,
//! };
//!
//! let x = DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 0.0, 2.0]);
//! let y = DMatrix::zeros(2, 2);
//! let skeleton = SkeletonTrajectory::new(x, y)?;
//! let widths = DMatrix::from_element(2, 2, std::f64::consts::SQRT_2);
//!
//! let whole = BodyPartition::new(0, 2);
//! let partitions = PartitionTable::empty()
//!     .with("all", whole)
//!     .with("head", whole)
//!     .with("body", whole)
//!     .with("tail", whole);
//!
//! let duration = Duration::compute(&skeleton, &widths, &partitions, 25.0, &PathConfig::default())?;
//! assert_eq!(duration.arena.width, 3.0);
//! assert_eq!(duration.worm.indices, vec![0, 2]);
//! # Ok::<(), worm_path::PathError>(())
//! ```

use nalgebra::DMatrix;
use tracing::debug;

use crate::arena::Arena;
use crate::config::PathConfig;
use crate::discretize::discretize;
use crate::error::{PathError, Result};
use crate::rasterize::populate_from;
use crate::skeleton::{PartitionTable, Region, SkeletonTrajectory};

/// Sparse occupancy of one body region.
///
/// `indices` are column-major positions in the arena grid (down each column
/// first) of every cell the region ever covered, in increasing order.
/// `times[i]` is the time in seconds spent in `indices[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DurationElement {
    /// Column-major cell indices, strictly increasing.
    pub indices: Vec<usize>,
    /// Seconds spent in each cell, all positive.
    pub times: Vec<f64>,
}

impl DurationElement {
    /// Encode an occupancy grid recorded at `fps` frames per second.
    #[must_use]
    pub fn from_grid(grid: &DMatrix<u32>, fps: f64) -> Self {
        // nalgebra stores matrices column-major
        let (indices, times) = grid
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(index, &count)| (index, f64::from(count) / fps))
            .unzip();
        Self { indices, times }
    }

    /// Rebuild the `(height, width)` occupancy grid.
    ///
    /// Counts are recovered as `round(time * fps)`.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths differ or an index falls outside the grid.
    pub fn to_grid(&self, height: usize, width: usize, fps: f64) -> Result<DMatrix<u32>> {
        if self.indices.len() != self.times.len() {
            return Err(PathError::invalid_input(format!(
                "{} indices but {} times",
                self.indices.len(),
                self.times.len()
            )));
        }
        let mut grid = DMatrix::<u32>::zeros(height, width);
        let n_cells = height * width;
        for (&index, &time) in self.indices.iter().zip(&self.times) {
            if index >= n_cells {
                return Err(PathError::invalid_input(format!(
                    "cell index {index} outside a {height}x{width} arena"
                )));
            }
            grid[index] = (time * fps).round() as u32;
        }
        Ok(grid)
    }

    /// Total time covered, in seconds.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.times.iter().sum()
    }

    /// Number of cells visited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no cell was visited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Arena plus per-region occupancy durations.
///
/// All four elements index into the same arena grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Duration {
    /// Arena extent.
    pub arena: Arena,
    /// Whole skeleton.
    pub worm: DurationElement,
    /// Head region.
    pub head: DurationElement,
    /// Midbody region (the `body` partition).
    pub midbody: DurationElement,
    /// Tail region.
    pub tail: DurationElement,
}

impl Duration {
    /// Compute the arena and the per-region durations of a trajectory.
    ///
    /// # Arguments
    ///
    /// * `skeleton` - Skeleton coordinates, `(points, frames)`
    /// * `widths` - Body widths, same shape as the skeleton
    /// * `partitions` - Needs `all`, `head`, `body`, `tail`; legacy
    ///   compatibility also reads `midbody`
    /// * `fps` - Video frame rate
    /// * `config` - Selects the mean-width policy and parallelism
    ///
    /// # Errors
    ///
    /// Returns [`PathError::DegenerateInput`] if the skeleton holds no valid
    /// coordinates; also fails on shape mismatches, missing partitions or a
    /// non-positive frame rate.
    pub fn compute(
        skeleton: &SkeletonTrajectory,
        widths: &DMatrix<f64>,
        partitions: &PartitionTable,
        fps: f64,
        config: &PathConfig,
    ) -> Result<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(PathError::invalid_input(format!(
                "frame rate must be positive, got {fps}"
            )));
        }
        if skeleton.is_degenerate() {
            return Err(PathError::degenerate(
                "skeleton has no valid coordinates; cannot build an arena",
            ));
        }
        if widths.shape() != skeleton.x().shape() {
            return Err(PathError::shape_mismatch(skeleton.x().shape(), widths.shape()));
        }

        let regions = partitions.regions(skeleton.n_points())?;
        let mean_width = config
            .compatibility
            .mean_width_policy()
            .mean_width(widths, partitions)?;

        let disc = discretize(skeleton, mean_width)?;
        let arena = Arena::from_discretized(skeleton, &disc);
        let grids: [DMatrix<u32>; 4] = populate_from(&disc, &regions, config.parallel_regions)?
            .try_into()
            .map_err(|grids: Vec<_>| {
                PathError::invalid_input(format!("expected 4 occupancy grids, got {}", grids.len()))
            })?;
        let [worm, head, midbody, tail] = grids.map(|grid| DurationElement::from_grid(&grid, fps));
        let duration = Self {
            arena,
            worm,
            head,
            midbody,
            tail,
        };

        debug!(
            mean_width,
            cells_visited = duration.worm.len(),
            "computed path duration"
        );
        Ok(duration)
    }

    /// Duration element of a region.
    #[must_use]
    pub const fn element(&self, region: Region) -> &DurationElement {
        match region {
            Region::All => &self.worm,
            Region::Head => &self.head,
            Region::Body => &self.midbody,
            Region::Tail => &self.tail,
        }
    }
}
