//! Per-sample scores of an SDAR model

use statrs::distribution::{Continuous, Normal};
use tracing::debug;

/// Gaussian summary of an SDAR model: discounted mean and error variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianState {
    pub mu: f64,
    /// Variance, not standard deviation
    pub sigma: f64,
}

/// Negative log density of `x` under `N(mean, variance)`
///
/// A variance at or below `floor` means the model predicts perfectly: the
/// score is 0 rather than infinite surprise.
pub fn log_loss(x: f64, mean: f64, variance: f64, floor: f64) -> f64 {
    if variance <= floor {
        return 0.0;
    }
    match Normal::new(mean, variance.sqrt()) {
        Ok(normal) => -normal.ln_pdf(x),
        Err(e) => {
            debug!(mean, variance, error = %e, "log-loss undefined, scoring 0");
            0.0
        }
    }
}

/// Distance between the model state before and after an update
///
/// `1 - (σ₁σ₂)^¼ exp(-¼(μ₁-μ₂)²/(σ₁+σ₂)) / √((σ₁+σ₂)/2)`, where `σ` are
/// variances. Identical states give 0. When `σ₁ + σ₂ <= floor` both states
/// are degenerate point masses and the distance is defined as 0.
pub fn hellinger(before: GaussianState, after: GaussianState, floor: f64) -> f64 {
    let total = before.sigma + after.sigma;
    if total <= floor {
        return 0.0;
    }
    let mean_gap = before.mu - after.mu;
    let overlap = (before.sigma * after.sigma).powf(0.25) * (-0.25 * mean_gap * mean_gap / total).exp()
        / (total / 2.0).sqrt();
    // overlap <= 1 analytically; rounding can push it just above
    (1.0 - overlap).max(0.0)
}
