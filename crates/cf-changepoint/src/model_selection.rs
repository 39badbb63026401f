//! AR order selection by AIC over a batch of samples

use cf_core::{ensure_finite, Error, Result};
use cf_linalg::{residual_variance, ArEstimator, ArInput, ArSolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Lower bound on `2πσ` inside the AIC logarithm
const AIC_VARIANCE_FLOOR: f64 = 1e-100;

/// Non-discounted AR(k) fit over a whole series
#[derive(Debug, Clone, PartialEq)]
pub struct ArBatchFit {
    pub order: usize,
    /// Mean of `x[k..]`
    pub mu: f64,
    /// Autocovariances `c[0..=k]` averaged over `i >= k`
    pub autocovariance: Vec<f64>,
    pub coefficients: Vec<f64>,
    /// Residual variance `c[0] - Σ a_i c[i]`; may be slightly negative
    pub sigma: f64,
}

impl ArBatchFit {
    /// Fit AR(`order`) to `x`, which needs more than `order` samples
    pub fn estimate(x: &[f64], order: usize, solver: ArSolver) -> Result<Self> {
        if order == 0 {
            return Err(Error::out_of_range("k", order, ">= 1"));
        }
        let t = x.len();
        if t <= order {
            return Err(Error::InsufficientData {
                expected: order + 1,
                actual: t,
            });
        }

        let tail = &x[order..];
        let mu = tail.iter().sum::<f64>() / tail.len() as f64;
        let autocovariance: Vec<f64> = (0..=order)
            .map(|j| {
                (order..t)
                    .map(|i| (x[i] - mu) * (x[i - j] - mu))
                    .sum::<f64>()
                    / (t - order) as f64
            })
            .collect();

        let centred: Vec<f64> = if solver.needs_samples() {
            x.iter().map(|v| v - mu).collect()
        } else {
            Vec::new()
        };
        let coefficients = solver.estimate(&ArInput::new(&autocovariance, &centred), order)?;
        let sigma = residual_variance(&autocovariance, &coefficients);

        Ok(Self {
            order,
            mu,
            autocovariance,
            coefficients,
            sigma,
        })
    }

    /// `n (ln(max(2πσ, ε)) + 1) + 2(k + 1)` for a series of length `n`
    pub fn aic(&self, n: usize) -> f64 {
        let v = (2.0 * std::f64::consts::PI * self.sigma).max(AIC_VARIANCE_FLOOR);
        n as f64 * (v.ln() + 1.0) + 2.0 * (self.order as f64 + 1.0)
    }
}

/// Order picked by [`ModelSelector::select`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSelection {
    pub order: usize,
    pub aic: f64,
}

/// Picks the AR order minimizing AIC
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSelector {
    max_k: usize,
    solver: ArSolver,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            max_k: 50,
            solver: ArSolver::default(),
        }
    }
}

impl ModelSelector {
    pub fn new(max_k: usize) -> Result<Self> {
        if max_k < 1 {
            return Err(Error::out_of_range("max_k", max_k, ">= 1"));
        }
        Ok(Self {
            max_k,
            ..Self::default()
        })
    }

    pub fn with_solver(mut self, solver: ArSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn max_k(&self) -> usize {
        self.max_k
    }

    /// AIC of every tested order `1..=min(len - 1, max_k)`, ascending in `k`
    #[instrument(skip(self, x), fields(samples = x.len(), max_k = self.max_k))]
    pub fn aic_profile(&self, x: &[f64]) -> Result<Vec<(usize, f64)>> {
        if x.len() < 2 {
            return Err(Error::InsufficientData {
                expected: 2,
                actual: x.len(),
            });
        }
        ensure_finite(x, "model selection samples")?;

        let highest = self.max_k.min(x.len() - 1);
        (1..=highest)
            .map(|k| {
                let fit = ArBatchFit::estimate(x, k, self.solver)?;
                let aic = fit.aic(x.len());
                debug!(k, sigma = fit.sigma, aic, "fitted AR order");
                Ok((k, aic))
            })
            .collect()
    }

    /// Order with the lowest AIC; ties keep the lowest order
    pub fn select(&self, x: &[f64]) -> Result<OrderSelection> {
        let mut best = OrderSelection {
            order: 1,
            aic: f64::INFINITY,
        };
        for (order, aic) in self.aic_profile(x)? {
            if aic < best.aic {
                best = OrderSelection { order, aic };
            }
        }
        Ok(best)
    }
}
