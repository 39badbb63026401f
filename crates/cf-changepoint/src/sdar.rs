//! Sequential Discounting AutoRegressive (SDAR) model
//!
//! One [`SdarModel`] tracks a discounted mean, discounted autocovariances and
//! a discounted prediction-error variance of a scalar stream, refitting its
//! AR(k) coefficients on every sample. Older samples are forgotten
//! geometrically at rate `r`.

use crate::params::{ScoreKind, SdarParameters};
use crate::score::{hellinger, log_loss, GaussianState};
use cf_core::{Error, Result, SeedSource};
use cf_linalg::{ArEstimator, ArInput};
use tracing::debug;

/// Online AR(k) estimator with forgetting factor `r`
#[derive(Debug, Clone)]
pub struct SdarModel {
    params: SdarParameters,
    mu: f64,
    sigma: f64,
    /// Discounted autocovariances `c[0..=k]`
    c: Vec<f64>,
    initial: GaussianState,
    last_prediction: f64,
    scratch: Vec<f64>,
}

impl SdarModel {
    /// Validate `params` and seed the mean and variance from `seed`
    ///
    /// The mean is drawn first, then the variance. Autocovariances always
    /// start at zero.
    pub fn new(params: SdarParameters, seed: &mut SeedSource) -> Result<Self> {
        params.validate()?;
        let initial = GaussianState {
            mu: seed.next_scalar(),
            sigma: seed.next_scalar(),
        };
        let k = params.k;
        Ok(Self {
            params,
            mu: initial.mu,
            sigma: initial.sigma,
            c: vec![0.0; k + 1],
            initial,
            last_prediction: initial.mu,
            scratch: Vec::with_capacity(k + 1),
        })
    }

    pub fn parameters(&self) -> &SdarParameters {
        &self.params
    }

    pub fn order(&self) -> usize {
        self.params.k
    }

    /// Discounted mean
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Discounted prediction-error variance, never negative
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn autocovariance(&self) -> &[f64] {
        &self.c
    }

    pub fn state(&self) -> GaussianState {
        GaussianState {
            mu: self.mu,
            sigma: self.sigma,
        }
    }

    /// Prediction `x̂` made during the most recent update
    pub fn last_prediction(&self) -> f64 {
        self.last_prediction
    }

    /// Fold `x` into the model and score it
    ///
    /// `context` holds previous observations, most recent last; only its last
    /// `k` entries are used. The score is computed from the state after the
    /// variance update: log-loss of `x` under `N(x̂, σ)`, or the Hellinger
    /// distance between the states before and after.
    pub fn update(&mut self, x: f64, context: &[f64]) -> Result<f64> {
        let k = self.params.k;
        if context.len() < k {
            return Err(Error::Configuration(format!(
                "SDAR context holds {} samples, AR({k}) needs {k}",
                context.len()
            )));
        }
        if !x.is_finite() {
            return Err(Error::non_finite("SDAR sample"));
        }
        let recent = &context[context.len() - k..];
        let r = self.params.r;
        let before = self.state();

        self.mu = (1.0 - r) * self.mu + r * x;
        let dx = x - self.mu;
        self.c[0] = (1.0 - r) * self.c[0] + r * dx * dx;
        for j in 1..=k {
            self.c[j] = (1.0 - r) * self.c[j] + r * dx * (recent[k - j] - self.mu);
        }

        let coefficients = if self.params.solver.needs_samples() {
            self.scratch.clear();
            self.scratch.extend(recent.iter().map(|v| v - self.mu));
            self.scratch.push(dx);
            self.params
                .solver
                .estimate(&ArInput::new(&self.c, &self.scratch), k)?
        } else {
            self.params
                .solver
                .estimate(&ArInput::from_autocovariance(&self.c), k)?
        };

        let prediction = self.mu
            + coefficients
                .iter()
                .enumerate()
                .map(|(i, a)| a * (recent[k - 1 - i] - self.mu))
                .sum::<f64>();
        self.last_prediction = prediction;

        let err = x - prediction;
        self.sigma = (1.0 - r) * self.sigma + r * err * err;
        if self.sigma < 0.0 {
            debug!(sigma = self.sigma, "clamping negative SDAR variance to 0");
            self.sigma = 0.0;
        }

        let floor = self.params.variance_floor;
        Ok(match self.params.score {
            ScoreKind::LogLoss => log_loss(x, prediction, self.sigma, floor),
            ScoreKind::Hellinger => hellinger(before, self.state(), floor),
        })
    }

    /// Return to the seeded state the model was built with
    pub fn reset(&mut self) {
        self.mu = self.initial.mu;
        self.sigma = self.initial.sigma;
        self.c.iter_mut().for_each(|c| *c = 0.0);
        self.last_prediction = self.initial.mu;
    }
}
