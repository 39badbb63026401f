//! Autoregressive coefficient solvers
//!
//! Three interchangeable ways of turning second-order statistics (or raw
//! samples) into AR(k) prediction coefficients:
//!
//! - [`DirectToeplitz`]: explicit Toeplitz matrix + LU solve
//! - [`LevinsonDurbin`]: O(k²) order recursion on the autocovariances
//! - [`Burg`]: forward/backward error minimization on the raw samples
//!
//! All of them return prediction coefficients `a_1..a_k` such that
//! `x̂_t - μ = Σ a_i (x_{t-i} - μ)`, and all of them collapse to the zero
//! vector on degenerate input instead of failing.

mod burg;
mod levinson;
mod toeplitz;

pub use burg::burg;
pub use levinson::{levinson_durbin, residual_variance};
pub use toeplitz::{toeplitz, yule_walker_direct};

use cf_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Everything a solver may look at
#[derive(Debug, Clone, Copy)]
pub struct ArInput<'a> {
    /// `c[0..=k]`: variance followed by lagged covariances
    pub autocovariance: &'a [f64],
    /// Mean-centred samples, oldest first, at least `k + 1` long for [`Burg`]
    pub samples: &'a [f64],
}

impl<'a> ArInput<'a> {
    pub fn new(autocovariance: &'a [f64], samples: &'a [f64]) -> Self {
        Self {
            autocovariance,
            samples,
        }
    }

    /// Input for solvers that only need the autocovariances
    pub fn from_autocovariance(autocovariance: &'a [f64]) -> Self {
        Self {
            autocovariance,
            samples: &[],
        }
    }
}

/// A strategy producing AR(k) prediction coefficients
pub trait ArEstimator {
    /// Name of the method
    fn name(&self) -> &'static str;

    /// Prediction coefficients `a_1..a_k`
    fn estimate(&self, input: &ArInput<'_>, order: usize) -> Result<Vec<f64>>;
}

/// Direct inversion of the Toeplitz system
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectToeplitz;

/// Levinson-Durbin recursion
#[derive(Debug, Clone, Copy, Default)]
pub struct LevinsonDurbin;

/// Burg's method on the raw samples
#[derive(Debug, Clone, Copy, Default)]
pub struct Burg;

impl ArEstimator for DirectToeplitz {
    fn name(&self) -> &'static str {
        "toeplitz"
    }

    fn estimate(&self, input: &ArInput<'_>, order: usize) -> Result<Vec<f64>> {
        yule_walker_direct(input.autocovariance, order)
    }
}

impl ArEstimator for LevinsonDurbin {
    fn name(&self) -> &'static str {
        "levinson"
    }

    fn estimate(&self, input: &ArInput<'_>, order: usize) -> Result<Vec<f64>> {
        levinson_durbin(input.autocovariance, order)
    }
}

impl ArEstimator for Burg {
    fn name(&self) -> &'static str {
        "burg"
    }

    fn estimate(&self, input: &ArInput<'_>, order: usize) -> Result<Vec<f64>> {
        // error-filter convention -> prediction convention
        Ok(burg(input.samples, order)?.into_iter().map(|a| -a).collect())
    }
}

/// Solver selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArSolver {
    #[default]
    Levinson,
    Toeplitz,
    Burg,
}

impl ArSolver {
    /// Whether the solver needs raw samples in [`ArInput::samples`]
    pub fn needs_samples(&self) -> bool {
        matches!(self, ArSolver::Burg)
    }
}

impl ArEstimator for ArSolver {
    fn name(&self) -> &'static str {
        match self {
            ArSolver::Levinson => LevinsonDurbin.name(),
            ArSolver::Toeplitz => DirectToeplitz.name(),
            ArSolver::Burg => Burg.name(),
        }
    }

    fn estimate(&self, input: &ArInput<'_>, order: usize) -> Result<Vec<f64>> {
        match self {
            ArSolver::Levinson => LevinsonDurbin.estimate(input, order),
            ArSolver::Toeplitz => DirectToeplitz.estimate(input, order),
            ArSolver::Burg => Burg.estimate(input, order),
        }
    }
}

/// Shared argument check: `k >= 1` and `c` holds `c[0..=k]`
pub(crate) fn check_autocovariance(c: &[f64], k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::Configuration("AR order must be at least 1".to_string()));
    }
    if c.len() < k + 1 {
        return Err(Error::size_mismatch(k + 1, c.len(), "autocovariance"));
    }
    Ok(())
}
