//! Skeleton trajectories and body partitions.
//!
//! A trajectory stores x and y coordinates as `(points, frames)` matrices:
//! row `i` is body point `i` (head first), column `j` is video frame `j`.
//! Missing samples are NaN.

use nalgebra::DMatrix;

use crate::error::{PathError, Result};

/// Number of body points in a standard skeleton.
pub const N_SKELETON_POINTS: usize = 49;

/// Tracked skeleton coordinates over a video.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonTrajectory {
    x: DMatrix<f64>,
    y: DMatrix<f64>,
}

impl SkeletonTrajectory {
    /// Build a trajectory from `(points, frames)` coordinate matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` have different shapes.
    pub fn new(x: DMatrix<f64>, y: DMatrix<f64>) -> Result<Self> {
        if x.shape() != y.shape() {
            return Err(PathError::shape_mismatch(x.shape(), y.shape()));
        }
        Ok(Self { x, y })
    }

    /// Build a trajectory from row-per-point nested vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if rows are ragged or `x` and `y` shapes differ.
    pub fn from_rows(x: &[Vec<f64>], y: &[Vec<f64>]) -> Result<Self> {
        Self::new(matrix_from_rows(x)?, matrix_from_rows(y)?)
    }

    /// X coordinates, `(points, frames)`.
    #[must_use]
    pub const fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    /// Y coordinates, `(points, frames)`.
    #[must_use]
    pub const fn y(&self) -> &DMatrix<f64> {
        &self.y
    }

    /// Number of body points.
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.x.nrows()
    }

    /// Number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.x.ncols()
    }

    /// True when there is no sample at all, or every x sample is NaN.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.x.is_empty() || self.x.iter().all(|v| v.is_nan())
    }

    /// Restrict to body points `start..end` visited in reverse (`end - 1` first).
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or exceeds the skeleton.
    pub fn reversed_points(&self, start: usize, end: usize) -> Result<Self> {
        if start >= end || end > self.n_points() {
            return Err(PathError::too_few_points(end, self.n_points()));
        }
        let n = end - start;
        let pick = |m: &DMatrix<f64>| {
            DMatrix::from_fn(n, m.ncols(), |r, c| m[(end - 1 - r, c)])
        };
        Ok(Self {
            x: pick(&self.x),
            y: pick(&self.y),
        })
    }
}

/// Build a `(rows, cols)` matrix from nested row vectors.
///
/// # Errors
///
/// Returns an error if the rows have different lengths.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(PathError::invalid_input(format!(
            "ragged rows: expected {n_cols} columns, found a row with {}",
            bad.len()
        )));
    }
    Ok(DMatrix::from_fn(rows.len(), n_cols, |r, c| rows[r][c]))
}

/// A contiguous, half-open range `[start, end)` of body point indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyPartition {
    /// First point in the partition.
    pub start: usize,
    /// One past the last point.
    pub end: usize,
}

impl BodyPartition {
    /// Create a partition over `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of points covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the partition covers no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body regions that receive their own arena occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Whole skeleton.
    All,
    /// Head region.
    Head,
    /// Body between head and tail (neck through hips).
    Body,
    /// Tail region.
    Tail,
}

impl Region {
    /// Regions in output order: worm, head, midbody, tail.
    pub const ALL: [Self; 4] = [Self::All, Self::Head, Self::Body, Self::Tail];

    /// Key in the partition table.
    #[must_use]
    pub const fn partition_name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Head => "head",
            Self::Body => "body",
            Self::Tail => "tail",
        }
    }

    /// Name of the corresponding duration element in results.
    #[must_use]
    pub const fn output_name(self) -> &'static str {
        match self {
            Self::All => "worm",
            Self::Head => "head",
            Self::Body => "midbody",
            Self::Tail => "tail",
        }
    }
}

/// Named body partitions of a skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    entries: Vec<(String, BodyPartition)>,
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PartitionTable {
    /// An empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Partitions of the standard 49-point skeleton.
    #[must_use]
    pub fn standard() -> Self {
        [
            ("head", 0, 8),
            ("neck", 8, 16),
            ("midbody", 16, 33),
            ("old_midbody_velocity", 20, 29),
            ("hips", 33, 41),
            ("tail", 41, 49),
            ("head_tip", 0, 4),
            ("head_base", 4, 8),
            ("tail_base", 40, 45),
            ("tail_tip", 45, 49),
            ("all", 0, 49),
            ("body", 8, 41),
        ]
        .into_iter()
        .fold(Self::empty(), |table, (name, start, end)| {
            table.with(name, BodyPartition::new(start, end))
        })
    }

    /// Add or replace a named partition.
    #[must_use]
    pub fn with(mut self, name: &str, partition: BodyPartition) -> Self {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = partition,
            None => self.entries.push((name.to_owned(), partition)),
        }
        self
    }

    /// Look up a partition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<BodyPartition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, p)| p)
    }

    /// Look up a partition and check it fits a skeleton of `n_points`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown, or the range is empty or
    /// exceeds the skeleton.
    pub fn require(&self, name: &str, n_points: usize) -> Result<BodyPartition> {
        let partition = self
            .get(name)
            .ok_or_else(|| PathError::invalid_input(format!("no partition named `{name}`")))?;
        if partition.is_empty() || partition.end > n_points {
            return Err(PathError::PartitionOutOfBounds {
                region: name.to_owned(),
                start: partition.start,
                end: partition.end,
                n_points,
            });
        }
        Ok(partition)
    }

    /// The partitions of the four duration regions, in [`Region::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if any of them is missing or out of bounds.
    pub fn regions(&self, n_points: usize) -> Result<[BodyPartition; 4]> {
        Ok([
            self.require(Region::All.partition_name(), n_points)?,
            self.require(Region::Head.partition_name(), n_points)?,
            self.require(Region::Body.partition_name(), n_points)?,
            self.require(Region::Tail.partition_name(), n_points)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_shape_check() {
        let x = DMatrix::<f64>::zeros(3, 4);
        let y = DMatrix::<f64>::zeros(3, 5);
        assert!(matches!(
            SkeletonTrajectory::new(x, y),
            Err(PathError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows() {
        let x = vec![vec![0.0, 2.0], vec![1.0, 3.0]];
        let y = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
        let traj = SkeletonTrajectory::from_rows(&x, &y).unwrap();
        assert_eq!(traj.n_points(), 2);
        assert_eq!(traj.n_frames(), 2);
        assert_eq!(traj.x()[(1, 0)], 1.0);

        let ragged = vec![vec![0.0, 2.0], vec![1.0]];
        assert!(SkeletonTrajectory::from_rows(&ragged, &ragged).is_err());
    }

    #[test]
    fn test_degenerate() {
        let nan = DMatrix::from_element(2, 3, f64::NAN);
        let traj = SkeletonTrajectory::new(nan.clone(), nan).unwrap();
        assert!(traj.is_degenerate());

        let empty = SkeletonTrajectory::new(DMatrix::zeros(0, 0), DMatrix::zeros(0, 0)).unwrap();
        assert!(empty.is_degenerate());
    }

    #[test]
    fn test_reversed_points() {
        let x = DMatrix::from_fn(6, 2, |r, c| (r * 10 + c) as f64);
        let traj = SkeletonTrajectory::new(x.clone(), x).unwrap();
        let sub = traj.reversed_points(1, 5).unwrap();
        assert_eq!(sub.n_points(), 4);
        assert_eq!(sub.x()[(0, 1)], 41.0);
        assert_eq!(sub.x()[(3, 0)], 10.0);
        assert!(traj.reversed_points(1, 7).is_err());
    }

    #[test]
    fn test_standard_partitions() {
        let table = PartitionTable::standard();
        assert_eq!(table.get("all"), Some(BodyPartition::new(0, 49)));
        assert_eq!(table.get("body"), Some(BodyPartition::new(8, 41)));
        assert_eq!(table.get("midbody"), Some(BodyPartition::new(16, 33)));

        let regions = table.regions(N_SKELETON_POINTS).unwrap();
        assert_eq!(regions[3], BodyPartition::new(41, 49));

        assert!(matches!(
            table.regions(20),
            Err(PathError::PartitionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_region_names() {
        let names: Vec<&str> = Region::ALL.iter().map(|r| r.output_name()).collect();
        assert_eq!(names, ["worm", "head", "midbody", "tail"]);
        assert_eq!(Region::Body.partition_name(), "body");
    }

    #[test]
    fn test_custom_table() {
        let table = PartitionTable::empty()
            .with("all", BodyPartition::new(0, 2))
            .with("all", BodyPartition::new(0, 3));
        assert_eq!(table.get("all"), Some(BodyPartition::new(0, 3)));
        assert!(table.require("head", 3).is_err());
    }
}
