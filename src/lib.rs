//! Worm Path Features
//!
//! Locomotion features computed from tracked worm skeletons.
//!
//! The input is a pair of `(points, frames)` coordinate matrices with NaN
//! for missing samples, plus body widths and body partitions. Three
//! features describe the worm's path:
//!
//! - **Range**: per-frame distance of the worm from the centroid of its path
//! - **Duration**: the explored arena, rasterized into cells scaled to the
//!   worm's body width, with the time each body region spent in each cell
//! - **Curvature**: change of travel direction per distance travelled
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::DMatrix;
//! use worm_path::{
//!     compute_path_features, CentroidVelocity, PartitionTable, PathConfig,
//!     SkeletonTrajectory, VentralMode,
//! };
//!
//! let n_frames = 100;
//! let x = DMatrix::from_fn(49, n_frames, |p, f| p as f64 + f as f64 * 0.4);
//! let y = DMatrix::from_fn(49, n_frames, |p, f| (f as f64 * 0.05).sin() * 10.0 + p as f64 * 0.2);
//! let skeleton = SkeletonTrajectory::new(x, y)?;
//! let widths = DMatrix::from_element(49, n_frames, 1.5);
//!
//! let features = compute_path_features(
//!     &skeleton,
//!     &widths,
//!     &PartitionTable::standard(),
//!     25.0,
//!     VentralMode::Unknown,
//!     &PathConfig::default(),
//!     &CentroidVelocity,
//! )?;
//!
//! assert_eq!(features.range.len(), n_frames);
//! # Ok::<(), worm_path::PathError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`discretize`] | Width-based scaling and rounding onto the arena grid |
//! | [`rasterize`] | Per-region occupancy grids |
//! | [`duration`] | Sparse occupancy times and the [`Duration`] aggregate |
//! | [`range`] | [`Range`] |
//! | [`curvature`] | [`PathCurvature`] |
//! | [`velocity`] | Velocity estimator seam used by curvature |
//! | [`compare`] | Tolerant comparison against reference results |
//! | `persist` | Stored records (feature `serde`) |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod arena;
pub mod compare;
pub mod config;
pub mod curvature;
pub mod discretize;
pub mod duration;
pub mod error;
pub mod features;
pub mod math;
#[cfg(feature = "serde")]
pub mod persist;
pub mod range;
pub mod rasterize;
pub mod skeleton;
pub mod velocity;

// Re-exports for convenient access
pub use arena::Arena;
pub use compare::{ClosenessOracle, Comparator, ComparisonPolicy, CorrelationOracle, FeatureCompare};
pub use config::{Compatibility, MeanWidthPolicy, PathConfig, VentralMode};
pub use curvature::{worm_path_curvature, PathCurvature};
pub use discretize::{discretize, DiscretizedSkeleton, ScaledBounds};
pub use duration::{Duration, DurationElement};
pub use error::{PathError, Result};
pub use features::{compute_path_features, PathFeatures};
pub use range::Range;
pub use rasterize::populate_arenas;
pub use skeleton::{BodyPartition, PartitionTable, Region, SkeletonTrajectory, N_SKELETON_POINTS};
pub use velocity::{CentroidVelocity, Velocity, VelocityEstimator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
