//! Velocity estimation over a sliding frame window.
//!
//! [`VelocityEstimator`] is the seam path curvature uses to obtain speed and
//! motion direction. [`CentroidVelocity`] is the default: it tracks the
//! per-frame centroid of the given body points.

use crate::config::VentralMode;
use crate::error::{PathError, Result};
use crate::math::angle::{atan2_degrees, wrap_degrees};
use crate::math::stats::nan_mean;
use crate::skeleton::SkeletonTrajectory;

/// Per-frame velocity components, aligned to the frame axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Velocity {
    /// Signed speed (units per second); negative while moving backwards.
    pub speed: Vec<f64>,
    /// Rate of change of body angle (degrees per second).
    pub angular_speed: Vec<f64>,
    /// Direction of travel (degrees, `atan2` convention).
    pub motion_direction: Vec<f64>,
}

/// Estimates velocity from a window of frames.
pub trait VelocityEstimator {
    /// Window length, in frames, spanning `sample_time` seconds at `fps`.
    fn frames_per_sample(&self, fps: f64, sample_time: f64) -> usize;

    /// Velocity of `skeleton` over windows of `sample_time` seconds.
    ///
    /// `avg_body_angle` holds one body orientation (degrees) per frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are not aligned on the frame axis.
    fn compute_velocity(
        &self,
        skeleton: &SkeletonTrajectory,
        avg_body_angle: &[f64],
        fps: f64,
        sample_time: f64,
        ventral_mode: VentralMode,
    ) -> Result<Velocity>;
}

/// Centroid displacement across a symmetric, odd-length frame window.
///
/// For frame `i` the window runs from `i - h` to `i + h`. Frames whose
/// window leaves the video, or whose window ends have no centroid, are NaN.
/// Speed is negated when travel points more than 90 degrees away from the
/// body orientation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidVelocity;

impl VelocityEstimator for CentroidVelocity {
    fn frames_per_sample(&self, fps: f64, sample_time: f64) -> usize {
        let half = (sample_time * fps / 2.0).round().max(1.0) as usize;
        2 * half + 1
    }

    fn compute_velocity(
        &self,
        skeleton: &SkeletonTrajectory,
        avg_body_angle: &[f64],
        fps: f64,
        sample_time: f64,
        ventral_mode: VentralMode,
    ) -> Result<Velocity> {
        let n = skeleton.n_frames();
        if avg_body_angle.len() != n {
            return Err(PathError::invalid_input(format!(
                "{} body angles for {n} frames",
                avg_body_angle.len()
            )));
        }

        let centroid = |m: &nalgebra::DMatrix<f64>| -> Vec<f64> {
            m.column_iter().map(|c| nan_mean(c.iter())).collect()
        };
        let cx = centroid(skeleton.x());
        let cy = centroid(skeleton.y());

        let half = (self.frames_per_sample(fps, sample_time) - 1) / 2;
        let window_time = (2 * half) as f64 / fps;
        let sign = if ventral_mode == VentralMode::Anticlockwise {
            -1.0
        } else {
            1.0
        };

        let mut velocity = Velocity {
            speed: vec![f64::NAN; n],
            angular_speed: vec![f64::NAN; n],
            motion_direction: vec![f64::NAN; n],
        };

        for i in half..n.saturating_sub(half) {
            let (left, right) = (i - half, i + half);
            let dx = cx[right] - cx[left];
            let dy = cy[right] - cy[left];
            if dx.is_nan() || dy.is_nan() {
                continue;
            }

            let direction = atan2_degrees(dy, dx);
            let mut speed = dx.hypot(dy) / window_time;
            if wrap_degrees(direction - avg_body_angle[i]).abs() > 90.0 {
                speed = -speed;
            }

            velocity.motion_direction[i] = direction;
            velocity.speed[i] = speed;
            velocity.angular_speed[i] =
                sign * wrap_degrees(avg_body_angle[right] - avg_body_angle[left]) / window_time;
        }

        Ok(velocity)
    }
}
