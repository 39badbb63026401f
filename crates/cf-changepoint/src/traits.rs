//! Core traits for change-point detection
//!
//! Detectors in this crate are online first: state is advanced one sample at
//! a time through [`OnlineDetector`]. Batch detection over a whole series
//! ([`SimpleDetector`]) is built on top of it and never disturbs the state of
//! the detector it is called on.

use crate::types::ChangePointResult;
use cf_core::Result;

/// Properties of a change-point detector
pub trait ChangePointDetectorProperties {
    /// Get the name of the detection algorithm
    fn algorithm_name(&self) -> &'static str;

    /// Get the minimum sample size required for detection
    fn minimum_sample_size(&self) -> usize;
}

/// Batch detection over a complete series
pub trait SimpleDetector: ChangePointDetectorProperties {
    /// Score every sample of `sample` and report the ones above threshold
    fn detect_simple(&self, sample: &[f64]) -> Result<ChangePointResult>;
}

/// Detectors built from a validated parameter record
pub trait ConfigurableDetector: Sized {
    type Parameters;

    /// Validate `params` and build a fresh detector
    fn with_parameters(params: Self::Parameters) -> Result<Self>;

    fn parameters(&self) -> &Self::Parameters;
}

/// Sample-at-a-time detection
pub trait OnlineDetector {
    type Output;

    /// Process a single point
    fn process_point(&mut self, value: f64) -> Result<Self::Output>;

    /// Reset internal state as if freshly constructed
    fn reset(&mut self);

    /// Number of points processed since construction or the last reset
    fn current_index(&self) -> usize;
}
