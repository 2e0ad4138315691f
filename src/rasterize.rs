//! Occupancy rasterization: how often each body region covered each cell.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::discretize::DiscretizedSkeleton;
use crate::error::{PathError, Result};
use crate::skeleton::BodyPartition;

/// Count, per region, the frames in which the region covered each grid cell.
///
/// Only frames with at least one valid sample anywhere on the skeleton are
/// visited; the test is against the whole skeleton, not the region, so a
/// frame counts for every region as soon as any point is valid. Inside a
/// visited frame, missing samples contribute nothing, and a cell covered by
/// several points of the region is counted once.
///
/// Returned grids have shape `shape = (height, width)` and are flipped
/// vertically, so row 0 holds the largest y.
///
/// Regions are independent, so with `parallel` set each grid is filled on
/// the rayon pool.
///
/// # Errors
///
/// Returns [`PathError::ShapeMismatch`] if `rows`, `cols` and `valid`
/// differ in shape, and [`PathError::InvalidInput`] if a valid sample
/// indexes outside `shape`.
pub fn populate_arenas(
    shape: (usize, usize),
    rows: &DMatrix<usize>,
    cols: &DMatrix<usize>,
    valid: &DMatrix<bool>,
    regions: &[BodyPartition],
    parallel: bool,
) -> Result<Vec<DMatrix<u32>>> {
    check_indices(shape, rows, cols, valid)?;

    let frames_run: Vec<usize> = valid
        .column_iter()
        .enumerate()
        .filter(|(_, column)| column.iter().any(|&v| v))
        .map(|(frame, _)| frame)
        .collect();

    debug!(
        n_frames = frames_run.len(),
        n_regions = regions.len(),
        "rasterizing body regions"
    );

    let fill = |region: &BodyPartition| {
        let grid = accumulate_region(shape, rows, cols, valid, *region, &frames_run);
        flip_rows(&grid)
    };

    Ok(if parallel {
        regions.par_iter().map(fill).collect()
    } else {
        regions.iter().map(fill).collect()
    })
}

/// Convenience wrapper over [`populate_arenas`] for a discretized skeleton.
///
/// # Errors
///
/// Same as [`populate_arenas`].
pub fn populate_from(
    disc: &DiscretizedSkeleton,
    regions: &[BodyPartition],
    parallel: bool,
) -> Result<Vec<DMatrix<u32>>> {
    populate_arenas(
        disc.grid_shape(),
        &disc.rows,
        &disc.cols,
        &disc.valid,
        regions,
        parallel,
    )
}

fn check_indices(
    (height, width): (usize, usize),
    rows: &DMatrix<usize>,
    cols: &DMatrix<usize>,
    valid: &DMatrix<bool>,
) -> Result<()> {
    for shape in [rows.shape(), cols.shape()] {
        if shape != valid.shape() {
            return Err(PathError::shape_mismatch(valid.shape(), shape));
        }
    }
    let out_of_grid = valid
        .iter()
        .zip(rows.iter().zip(cols.iter()))
        .any(|(&v, (&r, &c))| v && (r >= height || c >= width));
    if out_of_grid {
        return Err(PathError::invalid_input(format!(
            "sample indices fall outside the {height}x{width} arena"
        )));
    }
    Ok(())
}

fn accumulate_region(
    (height, width): (usize, usize),
    rows: &DMatrix<usize>,
    cols: &DMatrix<usize>,
    valid: &DMatrix<bool>,
    region: BodyPartition,
    frames: &[usize],
) -> DMatrix<u32> {
    let mut grid = DMatrix::<u32>::zeros(height, width);
    let end = region.end.min(valid.nrows());
    let mut cells: Vec<(usize, usize)> = Vec::with_capacity(region.len());
    for &frame in frames {
        cells.clear();
        cells.extend(
            (region.start..end)
                .filter(|&point| valid[(point, frame)])
                .map(|point| (rows[(point, frame)], cols[(point, frame)])),
        );
        cells.sort_unstable();
        cells.dedup();
        for &cell in &cells {
            grid[cell] += 1;
        }
    }
    grid
}

/// Reverse the row order of a grid.
#[must_use]
pub fn flip_rows(grid: &DMatrix<u32>) -> DMatrix<u32> {
    let last = grid.nrows().saturating_sub(1);
    DMatrix::from_fn(grid.nrows(), grid.ncols(), |r, c| grid[(last - r, c)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretize::discretize;
    use crate::skeleton::SkeletonTrajectory;

    #[test]
    fn test_single_row_scenario() {
        let skel = SkeletonTrajectory::from_rows(
            &[vec![0.0, 2.0], vec![0.0, 2.0]],
            &[vec![0.0, 0.0], vec![0.0, 0.0]],
        )
        .unwrap();
        let disc = discretize(&skel, std::f64::consts::SQRT_2).unwrap();
        let grids = populate_from(&disc, &[BodyPartition::new(0, 2)], false).unwrap();

        assert_eq!(grids.len(), 1);
        let grid = &grids[0];
        assert_eq!(grid.shape(), (1, 3));
        // Both points share a cell in each frame
        assert_eq!(grid[(0, 0)], 1);
        assert_eq!(grid[(0, 1)], 0);
        assert_eq!(grid[(0, 2)], 1);
    }

    #[test]
    fn test_rows_are_flipped() {
        // One point moving up: y = 0 then y = 2
        let skel = SkeletonTrajectory::from_rows(&[vec![0.0, 0.0]], &[vec![0.0, 2.0]]).unwrap();
        let disc = discretize(&skel, std::f64::consts::SQRT_2).unwrap();
        let grids = populate_from(&disc, &[BodyPartition::new(0, 1)], false).unwrap();
        let grid = &grids[0];
        assert_eq!(grid.shape(), (3, 1));
        // max y lands on row 0
        assert_eq!(grid[(0, 0)], 1);
        assert_eq!(grid[(1, 0)], 0);
        assert_eq!(grid[(2, 0)], 1);
    }

    #[test]
    fn test_whole_skeleton_mask_selects_frames() {
        // Frame 1: only point 0 valid. Region {1} still visits frame 1 but
        // its missing sample adds nothing. Frame 2 is empty and skipped.
        let nan = f64::NAN;
        let skel = SkeletonTrajectory::from_rows(
            &[vec![0.0, 1.0, nan], vec![1.0, nan, nan]],
            &[vec![0.0, 0.0, nan], vec![0.0, nan, nan]],
        )
        .unwrap();
        let disc = discretize(&skel, std::f64::consts::SQRT_2).unwrap();
        assert_eq!(disc.frames_with_data(), vec![0, 1]);

        let grids = populate_from(
            &disc,
            &[BodyPartition::new(0, 1), BodyPartition::new(1, 2)],
            false,
        )
        .unwrap();
        assert_eq!(grids[0].iter().sum::<u32>(), 2);
        assert_eq!(grids[1].iter().sum::<u32>(), 1);
        assert_eq!(grids[1][(0, 1)], 1);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let x: Vec<Vec<f64>> = (0..6)
            .map(|p| (0..20).map(|f| (p + f) as f64 * 0.7).collect())
            .collect();
        let y: Vec<Vec<f64>> = (0..6)
            .map(|p| (0..20).map(|f| (f as f64 * 0.3).sin() * 4.0 + p as f64).collect())
            .collect();
        let skel = SkeletonTrajectory::from_rows(&x, &y).unwrap();
        let disc = discretize(&skel, 1.0).unwrap();
        let regions = [
            BodyPartition::new(0, 6),
            BodyPartition::new(0, 2),
            BodyPartition::new(2, 4),
            BodyPartition::new(4, 6),
        ];
        let serial = populate_from(&disc, &regions, false).unwrap();
        let parallel = populate_from(&disc, &regions, true).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(serial[0].iter().sum::<u32>(), 6 * 20);
    }

    #[test]
    fn test_shared_cell_counts_once_per_frame() {
        // Two points on the same spot for one frame
        let rows = DMatrix::from_element(2, 1, 0usize);
        let cols = DMatrix::from_element(2, 1, 0usize);
        let valid = DMatrix::from_element(2, 1, true);
        let grids = populate_arenas((1, 1), &rows, &cols, &valid, &[BodyPartition::new(0, 2)], false)
            .unwrap();
        assert_eq!(grids[0][(0, 0)], 1);
    }

    #[test]
    fn test_indices_outside_shape_rejected() {
        let rows = DMatrix::from_element(1, 1, 3usize);
        let cols = DMatrix::from_element(1, 1, 0usize);
        let valid = DMatrix::from_element(1, 1, true);
        let result = populate_arenas((2, 2), &rows, &cols, &valid, &[BodyPartition::new(0, 1)], true);
        assert!(matches!(result, Err(PathError::InvalidInput(_))));

        // Masked samples are never used as indices
        let masked = DMatrix::from_element(1, 1, false);
        assert!(populate_arenas((2, 2), &rows, &cols, &masked, &[BodyPartition::new(0, 1)], true).is_ok());

        let short = DMatrix::from_element(1, 2, 0usize);
        assert!(matches!(
            populate_arenas((2, 2), &short, &cols, &valid, &[BodyPartition::new(0, 1)], false),
            Err(PathError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_flip_rows_empty() {
        let grid = DMatrix::<u32>::zeros(0, 3);
        assert_eq!(flip_rows(&grid).shape(), (0, 3));
    }
}
