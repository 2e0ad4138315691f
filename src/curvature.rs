//! Path curvature: change in motion direction per distance travelled.
//!
//! Only the body points between head and tail tips are used (points 4
//! through 44, visited tail to head). For each frame `i` the curvature is
//! the wrapped change in motion direction between frame `i` and frame
//! `i + w - 1`, divided by a distance built from the speed at `i` and
//! `i + w`, where `w` is the velocity window in frames. Results are in
//! radians per distance unit; frames without a usable distance are NaN.

use std::f64::consts::PI;

use tracing::debug;

use crate::config::{PathConfig, VentralMode};
use crate::error::{PathError, Result};
use crate::math::angle::{atan2_degrees, wrap_degrees};
use crate::math::stats::mean;
use crate::skeleton::SkeletonTrajectory;
use crate::velocity::VelocityEstimator;

/// First body point used for curvature.
pub const BODY_FIRST_POINT: usize = 4;

/// Last body point used for curvature (inclusive).
pub const BODY_LAST_POINT: usize = 44;

/// Path curvature per frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathCurvature {
    /// Radians per distance unit, NaN where undefined.
    pub value: Vec<f64>,
}

impl PathCurvature {
    /// Compute path curvature. See [`worm_path_curvature`].
    ///
    /// # Errors
    ///
    /// Same as [`worm_path_curvature`].
    pub fn compute<V: VelocityEstimator + ?Sized>(
        skeleton: &SkeletonTrajectory,
        fps: f64,
        ventral_mode: VentralMode,
        config: &PathConfig,
        estimator: &V,
    ) -> Result<Self> {
        worm_path_curvature(skeleton, fps, ventral_mode, config, estimator)
            .map(|value| Self { value })
    }
}

/// Mean body orientation per frame, in degrees.
///
/// Averages the vectors between consecutive body points; a missing point
/// makes the frame NaN.
#[must_use]
pub fn average_body_angles(body: &SkeletonTrajectory) -> Vec<f64> {
    let mean_diff = |m: &nalgebra::DMatrix<f64>, frame: usize| -> f64 {
        let column = m.column(frame);
        let diffs: Vec<f64> = column
            .iter()
            .zip(column.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect();
        mean(&diffs)
    };
    (0..body.n_frames())
        .map(|frame| atan2_degrees(mean_diff(body.y(), frame), mean_diff(body.x(), frame)))
        .collect()
}

/// Compute path curvature for a 49-point style skeleton.
///
/// # Arguments
///
/// * `skeleton` - Skeleton coordinates with at least 45 body points
/// * `fps` - Video frame rate
/// * `ventral_mode` - Ventral side annotation, passed to the estimator
/// * `config` - Supplies `body_diff` (velocity window, seconds) and
///   `min_distance`
/// * `estimator` - Velocity estimator
///
/// # Errors
///
/// Returns an error if the skeleton is too short, `fps` is not positive,
/// the configuration is invalid, or the estimator fails.
pub fn worm_path_curvature<V: VelocityEstimator + ?Sized>(
    skeleton: &SkeletonTrajectory,
    fps: f64,
    ventral_mode: VentralMode,
    config: &PathConfig,
    estimator: &V,
) -> Result<Vec<f64>> {
    config.validate()?;
    if !(fps.is_finite() && fps > 0.0) {
        return Err(PathError::invalid_input(format!(
            "frame rate must be positive, got {fps}"
        )));
    }
    if skeleton.n_points() <= BODY_LAST_POINT {
        return Err(PathError::too_few_points(
            BODY_LAST_POINT + 1,
            skeleton.n_points(),
        ));
    }

    let body = skeleton.reversed_points(BODY_FIRST_POINT, BODY_LAST_POINT + 1)?;
    let body_angles = average_body_angles(&body);

    let velocity =
        estimator.compute_velocity(&body, &body_angles, fps, config.body_diff, ventral_mode)?;
    let frame_scale = estimator.frames_per_sample(fps, config.body_diff);

    let speed: Vec<f64> = velocity.speed.iter().map(|s| s.abs()).collect();
    let diff_motion = motion_direction_change(&velocity.motion_direction, frame_scale);
    let distance = windowed_distance(&speed, frame_scale, config.body_diff, config.min_distance);

    debug!(
        n_frames = speed.len(),
        frame_scale,
        defined = distance.iter().filter(|d| !d.is_nan()).count(),
        "computed path curvature distances"
    );

    Ok(diff_motion
        .iter()
        .zip(&distance)
        .map(|(angle, dist)| angle / dist * (PI / 180.0))
        .collect())
}

/// Change in motion direction from frame `i` to frame `i + frame_scale - 1`.
///
/// Wrapped into `(-180, 180]`; NaN where the later frame does not exist.
#[must_use]
pub fn motion_direction_change(motion_direction: &[f64], frame_scale: usize) -> Vec<f64> {
    let n = motion_direction.len();
    let mut diff = vec![f64::NAN; n];
    if frame_scale == 0 || n < frame_scale {
        return diff;
    }
    for i in 0..=(n - frame_scale) {
        diff[i] = wrap_degrees(motion_direction[i + frame_scale - 1] - motion_direction[i]);
    }
    diff
}

/// Distance travelled around each frame, from the speeds at `i` and
/// `i + frame_scale`.
///
/// Defined for frames `h .. n - frame_scale - 1` with `h = (frame_scale - 1) / 2`
/// as `speed[i] + speed[i + frame_scale] * body_diff / 2`. Values below
/// `min_distance` become NaN.
#[must_use]
pub fn windowed_distance(
    speed: &[f64],
    frame_scale: usize,
    body_diff: f64,
    min_distance: f64,
) -> Vec<f64> {
    let n = speed.len();
    let half = frame_scale.saturating_sub(1) / 2;
    let end = n.saturating_sub(frame_scale + 1);

    let mut distance = vec![f64::NAN; n];
    for i in half..end {
        let d = speed[i] + speed[i + frame_scale] * body_diff / 2.0;
        if d >= min_distance {
            distance[i] = d;
        }
    }
    distance
}
