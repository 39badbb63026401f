//! Validated parameter records for the detectors

use cf_core::{Error, Result, SeedPolicy};
use cf_linalg::ArSolver;
use serde::{Deserialize, Serialize};

/// Per-sample score emitted by an SDAR model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Negative log density of the sample under `N(x̂, σ)`
    LogLoss,
    /// Hellinger-type distance between the model before and after the update
    #[default]
    Hellinger,
}

/// How the pipeline behaves before its buffers are full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Skip a stage (score 0) until its context window holds `k` samples
    #[default]
    WaitForFill,
    /// Start every window full of zeros; the pipeline is steady from the first sample
    ZeroPadded,
}

/// Parameters of one SDAR model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdarParameters {
    /// Discount rate, in (0, 1)
    pub r: f64,
    /// AR order, at least 1
    pub k: usize,
    pub solver: ArSolver,
    pub score: ScoreKind,
    /// Variances at or below this count as zero
    pub variance_floor: f64,
}

impl SdarParameters {
    pub fn new(r: f64, k: usize) -> Self {
        Self {
            r,
            k,
            solver: ArSolver::default(),
            score: ScoreKind::default(),
            variance_floor: DEFAULT_VARIANCE_FLOOR,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_discount("r", self.r)?;
        check_at_least_one("k", self.k)?;
        check_floor(self.variance_floor)
    }
}

/// Variance treated as zero by the score functions
pub const DEFAULT_VARIANCE_FLOOR: f64 = 1e-12;

/// Parameters of a two-stage ChangeFinder pipeline
///
/// When deserialized, absent fields take their defaults and an absent
/// `r_change` is half of `r`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ChangeFinderFields")]
pub struct ChangeFinderParameters {
    /// Discount rate of the outlier stage
    pub r: f64,
    /// Discount rate of the change stage
    pub r_change: f64,
    /// AR order of both stages
    pub k: usize,
    /// Smoothing window of outlier scores
    pub t1: usize,
    /// Smoothing window of change scores
    pub t2: usize,
    pub score: ScoreKind,
    pub solver: ArSolver,
    pub warmup: WarmupPolicy,
    pub seed: SeedPolicy,
    pub variance_floor: f64,
}

impl Default for ChangeFinderParameters {
    fn default() -> Self {
        Self {
            r: 0.02,
            r_change: 0.01,
            k: 1,
            t1: 10,
            t2: 5,
            score: ScoreKind::default(),
            solver: ArSolver::default(),
            warmup: WarmupPolicy::default(),
            seed: SeedPolicy::default(),
            variance_floor: DEFAULT_VARIANCE_FLOOR,
        }
    }
}

/// Serialized form of [`ChangeFinderParameters`] with an optional `r_change`
#[derive(Deserialize)]
#[serde(default)]
struct ChangeFinderFields {
    r: f64,
    r_change: Option<f64>,
    k: usize,
    t1: usize,
    t2: usize,
    score: ScoreKind,
    solver: ArSolver,
    warmup: WarmupPolicy,
    seed: SeedPolicy,
    variance_floor: f64,
}

impl Default for ChangeFinderFields {
    fn default() -> Self {
        let defaults = ChangeFinderParameters::default();
        Self {
            r: defaults.r,
            r_change: None,
            k: defaults.k,
            t1: defaults.t1,
            t2: defaults.t2,
            score: defaults.score,
            solver: defaults.solver,
            warmup: defaults.warmup,
            seed: defaults.seed,
            variance_floor: defaults.variance_floor,
        }
    }
}

impl From<ChangeFinderFields> for ChangeFinderParameters {
    fn from(fields: ChangeFinderFields) -> Self {
        Self {
            r: fields.r,
            r_change: fields.r_change.unwrap_or(fields.r / 2.0),
            k: fields.k,
            t1: fields.t1,
            t2: fields.t2,
            score: fields.score,
            solver: fields.solver,
            warmup: fields.warmup,
            seed: fields.seed,
            variance_floor: fields.variance_floor,
        }
    }
}

impl ChangeFinderParameters {
    /// Both stages share the discount rate `r`
    pub fn new(r: f64, k: usize, t1: usize, t2: usize) -> Self {
        Self {
            r,
            r_change: r,
            k,
            t1,
            t2,
            ..Self::default()
        }
    }

    pub fn with_r_change(mut self, r_change: f64) -> Self {
        self.r_change = r_change;
        self
    }

    pub fn with_score(mut self, score: ScoreKind) -> Self {
        self.score = score;
        self
    }

    pub fn with_solver(mut self, solver: ArSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_warmup(mut self, warmup: WarmupPolicy) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_variance_floor(mut self, variance_floor: f64) -> Self {
        self.variance_floor = variance_floor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_discount("r", self.r)?;
        check_discount("r_change", self.r_change)?;
        check_at_least_one("k", self.k)?;
        check_at_least_one("t1", self.t1)?;
        check_at_least_one("t2", self.t2)?;
        check_floor(self.variance_floor)
    }

    /// SDAR parameters of the outlier stage
    pub fn outlier_stage(&self) -> SdarParameters {
        self.stage(self.r)
    }

    /// SDAR parameters of the change stage
    pub fn change_stage(&self) -> SdarParameters {
        self.stage(self.r_change)
    }

    fn stage(&self, r: f64) -> SdarParameters {
        SdarParameters {
            r,
            k: self.k,
            solver: self.solver,
            score: self.score,
            variance_floor: self.variance_floor,
        }
    }
}

/// How SST computes the dominant subspaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SstMethod {
    /// Full SVD of both trajectory matrices
    #[default]
    Exact,
    /// Power iteration, Lanczos and tridiagonal QR
    Iterative,
}

/// Parameters of Singular Spectrum Transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SstParameters {
    /// Window length `w`; each call needs `2w` past and `2w` current samples
    pub window: usize,
    /// Subspace rank `r`, in [1, w]
    pub rank: usize,
    #[serde(default)]
    pub method: SstMethod,
    /// Cap on power-iteration steps per score call
    #[serde(default = "default_power_iterations")]
    pub power_iterations: usize,
    /// Power iteration stops once a step moves the unit iterate by at most this
    #[serde(default = "default_power_tolerance")]
    pub power_tolerance: f64,
    #[serde(default = "default_qr_iterations")]
    pub qr_iterations: usize,
    #[serde(default = "default_qr_tolerance")]
    pub qr_tolerance: f64,
    #[serde(default)]
    pub seed: SeedPolicy,
}

fn default_power_iterations() -> usize {
    1000
}

fn default_power_tolerance() -> f64 {
    1e-12
}

fn default_qr_iterations() -> usize {
    100
}

fn default_qr_tolerance() -> f64 {
    1e-6
}

impl SstParameters {
    pub fn new(window: usize, rank: usize) -> Self {
        Self {
            window,
            rank,
            method: SstMethod::default(),
            power_iterations: default_power_iterations(),
            power_tolerance: default_power_tolerance(),
            qr_iterations: default_qr_iterations(),
            qr_tolerance: default_qr_tolerance(),
            seed: SeedPolicy::default(),
        }
    }

    pub fn iterative(mut self) -> Self {
        self.method = SstMethod::Iterative;
        self
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_at_least_one("window", self.window)?;
        if self.rank < 1 || self.rank > self.window {
            return Err(Error::out_of_range(
                "rank",
                self.rank,
                &format!("in [1, {}]", self.window),
            ));
        }
        if !(self.power_tolerance >= 0.0 && self.power_tolerance.is_finite()) {
            return Err(Error::out_of_range(
                "power_tolerance",
                self.power_tolerance,
                "finite and >= 0",
            ));
        }
        if !(self.qr_tolerance > 0.0 && self.qr_tolerance.is_finite()) {
            return Err(Error::out_of_range("qr_tolerance", self.qr_tolerance, "positive"));
        }
        Ok(())
    }

    /// Samples needed on each side of a score call
    pub fn samples_per_side(&self) -> usize {
        2 * self.window
    }

    /// Size of the Lanczos tridiagonal: `2r`, or `2r - 1` for odd `r`, capped at `w`
    pub fn lanczos_size(&self) -> usize {
        let s = if self.rank % 2 == 0 {
            2 * self.rank
        } else {
            2 * self.rank - 1
        };
        s.min(self.window)
    }
}

fn check_discount(name: &str, r: f64) -> Result<()> {
    if r > 0.0 && r < 1.0 {
        Ok(())
    } else {
        Err(Error::out_of_range(name, r, "in (0, 1)"))
    }
}

fn check_at_least_one(name: &str, value: usize) -> Result<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(Error::out_of_range(name, value, ">= 1"))
    }
}

fn check_floor(floor: f64) -> Result<()> {
    if floor >= 0.0 && floor.is_finite() {
        Ok(())
    } else {
        Err(Error::out_of_range("variance_floor", floor, "finite and >= 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ChangeFinderParameters::default();
        assert_eq!(params.r, 0.02);
        assert_eq!(params.r_change, 0.01);
        assert_eq!((params.k, params.t1, params.t2), (1, 10, 5));
        assert_eq!(params.score, ScoreKind::Hellinger);
        assert_eq!(params.warmup, WarmupPolicy::WaitForFill);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_new_shares_discount() {
        let params = ChangeFinderParameters::new(0.5, 1, 7, 7);
        assert_eq!(params.r_change, 0.5);
        assert_eq!(params.change_stage().r, 0.5);
        let halved = params.with_r_change(0.25);
        assert_eq!(halved.outlier_stage().r, 0.5);
        assert_eq!(halved.change_stage().r, 0.25);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let base = ChangeFinderParameters::new(0.5, 1, 7, 7);
        for bad in [
            ChangeFinderParameters { r: 0.0, ..base.clone() },
            ChangeFinderParameters { r: 1.0, ..base.clone() },
            ChangeFinderParameters { r: f64::NAN, ..base.clone() },
            ChangeFinderParameters { r_change: 1.5, ..base.clone() },
            ChangeFinderParameters { k: 0, ..base.clone() },
            ChangeFinderParameters { t1: 0, ..base.clone() },
            ChangeFinderParameters { t2: 0, ..base.clone() },
            ChangeFinderParameters { variance_floor: -1.0, ..base.clone() },
        ] {
            let err = bad.validate().unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }
        // short smoothing windows are allowed
        assert!(ChangeFinderParameters::new(0.5, 1, 1, 1).validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let params: ChangeFinderParameters =
            serde_json::from_str(r#"{"r": 0.1, "k": 3, "score": "log_loss"}"#).unwrap();
        assert_eq!(params.r, 0.1);
        assert_eq!(params.k, 3);
        assert_eq!(params.t1, 10);
        assert_eq!(params.score, ScoreKind::LogLoss);
        assert_eq!(params.solver, ArSolver::Levinson);
    }

    #[test]
    fn test_json_without_r_change_halves_r() {
        let params: ChangeFinderParameters = serde_json::from_str(r#"{"r": 0.005}"#).unwrap();
        assert_eq!(params.r, 0.005);
        assert_eq!(params.r_change, 0.0025);
        assert_eq!(params.change_stage().r, 0.0025);

        let empty: ChangeFinderParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ChangeFinderParameters::default());

        let explicit: ChangeFinderParameters =
            serde_json::from_str(r#"{"r": 0.2, "r_change": 0.2}"#).unwrap();
        assert_eq!(explicit.r_change, 0.2);

        let text = serde_json::to_string(&params).unwrap();
        let back: ChangeFinderParameters = serde_json::from_str(&text).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_sst_parameters() {
        assert!(SstParameters::new(10, 3).validate().is_ok());
        assert!(SstParameters::new(0, 1).validate().is_err());
        assert!(SstParameters::new(4, 0).validate().is_err());
        assert!(SstParameters::new(4, 5).validate().is_err());

        assert_eq!(SstParameters::new(10, 2).lanczos_size(), 4);
        assert_eq!(SstParameters::new(10, 3).lanczos_size(), 5);
        assert_eq!(SstParameters::new(3, 3).lanczos_size(), 3);
        assert_eq!(SstParameters::new(10, 1).samples_per_side(), 20);

        let params: SstParameters = serde_json::from_str(r#"{"window": 8, "rank": 2}"#).unwrap();
        assert_eq!(params.method, SstMethod::Exact);
        assert_eq!(params.power_iterations, 1000);
        assert_eq!(params.power_tolerance, 1e-12);
        assert_eq!(params.qr_iterations, 100);

        let negative = SstParameters {
            power_tolerance: -1.0,
            ..SstParameters::new(4, 1)
        };
        assert!(negative.validate().unwrap_err().is_configuration());
    }
}
