//! Singular Spectrum Transformation
//!
//! SST compares the dominant left-singular subspace of a trajectory matrix
//! built from past samples with the one built from current samples. The
//! score is one minus the cosine of the smallest principal angle between
//! them: 0 for identical subspaces, 1 for orthogonal ones.
//!
//! Two paths are available. [`SstMethod::Exact`] runs a full SVD of both
//! matrices. [`SstMethod::Iterative`] avoids the SVDs: a warm-started power
//! iteration finds the dominant direction of the current matrix, a short
//! Lanczos run on `H Hᵀ` started from that direction builds a small
//! tridiagonal matrix, and its eigenvectors give the score.

use crate::params::{SstMethod, SstParameters};
use crate::traits::{ChangePointDetectorProperties, ConfigurableDetector, SimpleDetector};
use crate::types::{threshold_changepoints, ChangePointResult, ChangeType};
use cf_core::{ensure_finite, Error, Result};
use cf_linalg::{lanczos, power_iteration, tridiag_eig};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument};

/// Singular Spectrum Transformation change scorer
#[derive(Debug, Clone)]
pub struct Sst {
    params: SstParameters,
    /// Probe vector warm-starting power iteration, carried across calls
    probe: DVector<f64>,
    initial_probe: DVector<f64>,
    threshold: Option<f64>,
}

impl Sst {
    /// Validate `params` and draw the initial probe vector
    pub fn new(params: SstParameters) -> Result<Self> {
        params.validate()?;
        let probe = DVector::from_vec(params.seed.source().unit_vector(params.window));
        Ok(Self {
            initial_probe: probe.clone(),
            probe,
            params,
            threshold: None,
        })
    }

    /// Report scores above `threshold` from [`SimpleDetector::detect_simple`]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn parameters(&self) -> &SstParameters {
        &self.params
    }

    /// Current power-iteration probe vector
    pub fn probe(&self) -> &DVector<f64> {
        &self.probe
    }

    /// Restore the probe vector drawn at construction
    pub fn reset(&mut self) {
        self.probe = self.initial_probe.clone();
    }

    /// Change score between two windows of `2w` samples each, oldest first
    pub fn score(&mut self, past: &[f64], current: &[f64]) -> Result<f64> {
        self.check_window(past, "SST past window")?;
        self.check_window(current, "SST current window")?;

        let w = self.params.window;
        let h = trajectory_matrix(past, w);
        let g = trajectory_matrix(current, w);

        let score = match self.params.method {
            SstMethod::Exact => self.exact_score(&h, &g)?,
            SstMethod::Iterative => self.iterative_score(&h, &g),
        };
        Ok(score.clamp(0.0, 1.0))
    }

    /// Score every sample of `series` that has full windows on both sides
    ///
    /// For each `t` in `[2w + 1, n - w)` the past window is
    /// `series[t - 2w - 1 .. t - 1]` and the current window is
    /// `series[t - w .. t + w]`. The returned vector has one entry per sample,
    /// 0 outside the scored range.
    #[instrument(skip(self, series), fields(samples = series.len(), window = self.params.window))]
    pub fn scan(&mut self, series: &[f64]) -> Result<Vec<f64>> {
        let n = series.len();
        let w = self.params.window;
        let minimum = self.scan_length();
        if n < minimum {
            return Err(Error::InsufficientData {
                expected: minimum,
                actual: n,
            });
        }
        ensure_finite(series, "SST series")?;

        let mut scores = vec![0.0; n];
        for t in (2 * w + 1)..(n - w) {
            let past = &series[t - 2 * w - 1..t - 1];
            let current = &series[t - w..t + w];
            scores[t] = self.score(past, current)?;
        }
        debug!(scored = n - 3 * w - 1, "SST scan complete");
        Ok(scores)
    }

    /// Shortest series for which [`Sst::scan`] scores at least one sample
    fn scan_length(&self) -> usize {
        3 * self.params.window + 2
    }

    fn check_window(&self, window: &[f64], context: &str) -> Result<()> {
        let expected = self.params.samples_per_side();
        if window.len() < expected {
            return Err(Error::InsufficientData {
                expected,
                actual: window.len(),
            });
        }
        if window.len() > expected {
            return Err(Error::size_mismatch(expected, window.len(), context));
        }
        ensure_finite(window, context)
    }

    /// `1 - σ₁(U_rᵀ Q_r)` with both bases from a full SVD
    fn exact_score(&self, h: &DMatrix<f64>, g: &DMatrix<f64>) -> Result<f64> {
        let rank = self.params.rank;
        let u = top_left_singular_vectors(h, rank)?;
        let q = top_left_singular_vectors(g, rank)?;
        let cross = u.transpose() * q;
        let top = cross.svd(false, false).singular_values.max();
        Ok(1.0 - top)
    }

    /// Krylov approximation of the same principal-angle score
    ///
    /// Lanczos is started from the dominant left singular vector of `G`,
    /// which lives in the same space as the columns of `H`. Power iteration
    /// runs until it settles or hits its step cap, starting from the probe;
    /// the probe is replaced by the right singular vector found this call.
    fn iterative_score(&mut self, h: &DMatrix<f64>, g: &DMatrix<f64>) -> f64 {
        let triplet = power_iteration(
            g,
            &self.probe,
            self.params.power_iterations,
            self.params.power_tolerance,
        );
        if triplet.iterations == self.params.power_iterations {
            debug!(iterations = triplet.iterations, "power iteration hit its step cap");
        }
        if triplet.v.norm() > 0.0 {
            self.probe = triplet.v.clone();
        } else {
            debug!("current trajectory matrix is zero, keeping SST probe");
        }

        let hht = h * h.transpose();
        let size = self.params.lanczos_size();
        let t = lanczos(&hht, &triplet.u, size);
        let eig = tridiag_eig(&t, self.params.qr_iterations, self.params.qr_tolerance);
        if !eig.converged {
            debug!(iterations = eig.iterations, "tridiagonal QR stopped before convergence");
        }

        let mass: f64 = eig
            .top_indices(self.params.rank.min(size))
            .into_iter()
            .map(|i| eig.vectors[(0, i)].powi(2))
            .sum();
        1.0 - mass.min(1.0).sqrt()
    }
}

/// `w × w` matrix whose column `i` is `x[i .. i + w]`
pub fn trajectory_matrix(x: &[f64], w: usize) -> DMatrix<f64> {
    DMatrix::from_fn(w, w, |row, col| x[col + row])
}

/// First `rank` left singular vectors of `m`, by descending singular value
fn top_left_singular_vectors(m: &DMatrix<f64>, rank: usize) -> Result<DMatrix<f64>> {
    let svd = m.clone().svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| Error::InvalidInput("SVD produced no left singular vectors".to_string()))?;

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    Ok(DMatrix::from_fn(u.nrows(), rank, |row, col| u[(row, order[col])]))
}

impl ChangePointDetectorProperties for Sst {
    fn algorithm_name(&self) -> &'static str {
        match self.params.method {
            SstMethod::Exact => "SST",
            SstMethod::Iterative => "SST (iterative)",
        }
    }

    fn minimum_sample_size(&self) -> usize {
        self.scan_length()
    }
}

impl ConfigurableDetector for Sst {
    type Parameters = SstParameters;

    fn with_parameters(params: SstParameters) -> Result<Self> {
        Self::new(params)
    }

    fn parameters(&self) -> &SstParameters {
        &self.params
    }
}

impl SimpleDetector for Sst {
    /// [`Sst::scan`] on a reset copy, thresholded into change points
    fn detect_simple(&self, sample: &[f64]) -> Result<ChangePointResult> {
        let mut fresh = self.clone();
        fresh.reset();
        let scores = fresh.scan(sample)?;
        let changepoints = match self.threshold {
            Some(threshold) => threshold_changepoints(&scores, threshold, ChangeType::SubspaceChange),
            None => Vec::new(),
        };
        Ok(ChangePointResult::new(
            changepoints,
            self.algorithm_name().to_string(),
            sample.len(),
            scores,
        ))
    }
}
