//! Path range: distance of each frame's mean position from the centroid.

use crate::math::stats::nan_mean;
use crate::skeleton::SkeletonTrajectory;

/// Per-frame distance of the worm from the centroid of its whole path.
///
/// A frame's position is the mean over its body points; one missing point
/// makes that frame NaN. The centroid averages the frames that have one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Range {
    /// One distance per frame, NaN where the frame has no position.
    pub value: Vec<f64>,
}

impl Range {
    /// Compute the range of a trajectory.
    #[must_use]
    pub fn compute(skeleton: &SkeletonTrajectory) -> Self {
        // NaN propagates through the sum; no points gives 0/0
        let frame_means = |m: &nalgebra::DMatrix<f64>| -> Vec<f64> {
            m.column_iter()
                .map(|column| column.sum() / column.nrows() as f64)
                .collect()
        };
        let mean_x = frame_means(skeleton.x());
        let mean_y = frame_means(skeleton.y());

        let centroid_x = nan_mean(&mean_x);
        let centroid_y = nan_mean(&mean_y);

        let value = mean_x
            .iter()
            .zip(&mean_y)
            .map(|(x, y)| (x - centroid_x).hypot(y - centroid_y))
            .collect();
        Self { value }
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
