//! Streaming outlier and change-point detection
//!
//! Umbrella crate re-exporting the workspace:
//!
//! - [`core`]: error type, fixed windows, seeding
//! - [`linalg`]: AR solvers and the spectral primitives behind SST
//! - [`changepoint`]: SDAR, ChangeFinder, model selection and SST
//! - [`detector`]: per-series glue, sample sources, event sinks
//!
//! ```rust
//! use changefinder::prelude::*;
//!
//! let mut finder = ChangeFinder::new(ChangeFinderParameters::new(0.5, 1, 7, 7)).unwrap();
//! let scores: Vec<f64> = (0..100)
//!     .map(|i| finder.update(if i < 50 { 0.0 } else { 10.0 }).unwrap().change)
//!     .collect();
//! assert!(scores.iter().all(|s| s.is_finite()));
//! ```

pub use cf_changepoint as changepoint;
pub use cf_core as core;
pub use cf_detector as detector;
pub use cf_linalg as linalg;

pub mod prelude {
    pub use cf_changepoint::{
        ArSolver, ChangeFinder, ChangeFinderParameters, ChangeFinderScore, ModelSelector,
        OnlineDetector, ScoreKind, SimpleDetector, Sst, SstParameters, WarmupPolicy,
    };
    pub use cf_core::{Error, Result, SeedPolicy};
    pub use cf_detector::{
        CsvSampleSource, Detector, DetectorConfig, EventSink, JsonLinesSink, SampleSource,
    };
}
