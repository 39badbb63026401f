//! Streaming outlier and change-point detection
//!
//! # Algorithms
//!
//! ## Online
//! - **SDAR** ([`SdarModel`]): AR(k) model refitted on every sample with
//!   exponential forgetting
//! - **ChangeFinder** ([`ChangeFinder`]): two cascaded SDAR stages with
//!   moving-average smoothing, yielding an outlier score and a change score
//!   per sample
//!
//! ## Windowed
//! - **SST** ([`Sst`]): Singular Spectrum Transformation, comparing the
//!   dominant subspaces of past and current trajectory matrices, with an
//!   exact SVD path and a Lanczos-based approximation
//!
//! ## Batch
//! - **ModelSelector** ([`ModelSelector`]): AIC scan picking the AR order for
//!   ChangeFinder
//!
//! ## Usage
//!
//! ```rust
//! use cf_changepoint::{ChangeFinder, ChangeFinderParameters};
//!
//! let params = ChangeFinderParameters::new(0.5, 1, 7, 7);
//! let mut finder = ChangeFinder::new(params).unwrap();
//!
//! for i in 0..100 {
//!     let x = if i < 50 { 0.0 } else { 10.0 };
//!     let score = finder.update(x).unwrap();
//!     assert!(score.change >= 0.0);
//! }
//! ```

pub mod changefinder;
pub mod model_selection;
pub mod params;
pub mod score;
pub mod sdar;
pub mod sst;
pub mod traits;
pub mod types;

pub use changefinder::{ChangeFinder, ChangeFinderScore, Phase};
pub use model_selection::{ArBatchFit, ModelSelector, OrderSelection};
pub use params::{
    ChangeFinderParameters, ScoreKind, SdarParameters, SstMethod, SstParameters, WarmupPolicy,
    DEFAULT_VARIANCE_FLOOR,
};
pub use score::{hellinger, log_loss, GaussianState};
pub use sdar::SdarModel;
pub use sst::{trajectory_matrix, Sst};

pub use traits::{
    ChangePointDetectorProperties, ConfigurableDetector, OnlineDetector, SimpleDetector,
};
pub use types::{threshold_changepoints, ChangePoint, ChangePointResult, ChangeType};

// Solver choice is part of the parameter records
pub use cf_linalg::ArSolver;
