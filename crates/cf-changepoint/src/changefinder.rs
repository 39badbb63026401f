//! Two-stage ChangeFinder pipeline
//!
//! Stage 1 scores every raw sample with an SDAR model (outlier score). The
//! outlier scores are smoothed with a moving average of width `t1`, and the
//! smoothed series feeds a second SDAR model whose scores, averaged over
//! `t2`, form the change score.

use crate::params::{ChangeFinderParameters, WarmupPolicy};
use crate::sdar::SdarModel;
use crate::traits::{
    ChangePointDetectorProperties, ConfigurableDetector, OnlineDetector, SimpleDetector,
};
use crate::types::{threshold_changepoints, ChangePointResult, ChangeType};
use cf_core::{ensure_finite, Error, FixedWindow, Result};
use serde::{Deserialize, Serialize};

/// Warm-up state of a pipeline
///
/// Phases only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Stage-1 context not yet full: outlier scores are 0
    WarmupStage1,
    /// Stage-2 context or change-score window not yet full
    WarmupStage2,
    /// Both stages warmed up
    Steady,
}

/// Scores produced for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeFinderScore {
    /// Stage-1 score of this sample, 0 while stage 1 warms up
    pub outlier: f64,
    /// Mean of the recent stage-2 scores, 0 while none exist
    pub change: f64,
    /// Phase reached after this sample
    pub phase: Phase,
}

/// Streaming outlier and change-point detector
#[derive(Debug, Clone)]
pub struct ChangeFinder {
    params: ChangeFinderParameters,
    outlier_model: SdarModel,
    change_model: SdarModel,
    outlier_context: FixedWindow,
    change_context: FixedWindow,
    outlier_scores: FixedWindow,
    change_scores: FixedWindow,
    threshold: Option<f64>,
    index: usize,
}

impl ChangeFinder {
    /// Validate `params` and build both stages
    pub fn new(params: ChangeFinderParameters) -> Result<Self> {
        params.validate()?;
        let mut seed = params.seed.source();
        let outlier_model = SdarModel::new(params.outlier_stage(), &mut seed)?;
        let change_model = SdarModel::new(params.change_stage(), &mut seed)?;

        let window = |capacity| match params.warmup {
            WarmupPolicy::WaitForFill => FixedWindow::new(capacity),
            WarmupPolicy::ZeroPadded => FixedWindow::zero_filled(capacity),
        };

        Ok(Self {
            outlier_context: window(params.k)?,
            change_context: window(params.k)?,
            outlier_scores: window(params.t1)?,
            change_scores: window(params.t2)?,
            outlier_model,
            change_model,
            params,
            threshold: None,
            index: 0,
        })
    }

    /// Report change scores above `threshold` from [`SimpleDetector::detect_simple`]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Feed one sample through both stages
    pub fn update(&mut self, x: f64) -> Result<ChangeFinderScore> {
        if !x.is_finite() {
            return Err(Error::non_finite("ChangeFinder sample"));
        }

        let outlier = if self.outlier_context.is_full() {
            let score = self
                .outlier_model
                .update(x, self.outlier_context.as_slice())?;
            self.outlier_scores.push(score);
            score
        } else {
            0.0
        };
        self.outlier_context.push(x);

        let y = self.outlier_scores.mean();

        if self.change_context.is_full() {
            let score = self.change_model.update(y, self.change_context.as_slice())?;
            self.change_scores.push(score);
        }
        self.change_context.push(y);

        self.index += 1;
        Ok(ChangeFinderScore {
            outlier,
            change: self.change_scores.mean(),
            phase: self.phase(),
        })
    }

    /// Current warm-up phase
    pub fn phase(&self) -> Phase {
        if !self.outlier_context.is_full() {
            Phase::WarmupStage1
        } else if !self.change_context.is_full() || !self.change_scores.is_full() {
            Phase::WarmupStage2
        } else {
            Phase::Steady
        }
    }

    pub fn outlier_model(&self) -> &SdarModel {
        &self.outlier_model
    }

    pub fn change_model(&self) -> &SdarModel {
        &self.change_model
    }

    /// Samples needed before the first steady score
    fn warmup_length(&self) -> usize {
        match self.params.warmup {
            WarmupPolicy::ZeroPadded => 1,
            // stage 2 first runs on the (k+1)-th sample, then fills t2
            WarmupPolicy::WaitForFill => self.params.k + self.params.t2,
        }
    }
}

fn refill(window: &mut FixedWindow, policy: WarmupPolicy) {
    window.clear();
    if policy == WarmupPolicy::ZeroPadded {
        for _ in 0..window.capacity() {
            window.push(0.0);
        }
    }
}

impl OnlineDetector for ChangeFinder {
    type Output = ChangeFinderScore;

    fn process_point(&mut self, value: f64) -> Result<ChangeFinderScore> {
        self.update(value)
    }

    fn reset(&mut self) {
        let policy = self.params.warmup;
        self.outlier_model.reset();
        self.change_model.reset();
        refill(&mut self.outlier_context, policy);
        refill(&mut self.change_context, policy);
        refill(&mut self.outlier_scores, policy);
        refill(&mut self.change_scores, policy);
        self.index = 0;
    }

    fn current_index(&self) -> usize {
        self.index
    }
}

impl ConfigurableDetector for ChangeFinder {
    type Parameters = ChangeFinderParameters;

    fn with_parameters(params: ChangeFinderParameters) -> Result<Self> {
        Self::new(params)
    }

    fn parameters(&self) -> &ChangeFinderParameters {
        &self.params
    }
}

impl ChangePointDetectorProperties for ChangeFinder {
    fn algorithm_name(&self) -> &'static str {
        "ChangeFinder"
    }

    fn minimum_sample_size(&self) -> usize {
        self.warmup_length()
    }
}

impl SimpleDetector for ChangeFinder {
    /// Replay `sample` through a reset copy; statistics are the change scores
    fn detect_simple(&self, sample: &[f64]) -> Result<ChangePointResult> {
        if sample.len() < self.minimum_sample_size() {
            return Err(Error::InsufficientData {
                expected: self.minimum_sample_size(),
                actual: sample.len(),
            });
        }
        ensure_finite(sample, "ChangeFinder series")?;

        let mut fresh = self.clone();
        fresh.reset();
        let scores = sample
            .iter()
            .map(|&x| fresh.update(x).map(|s| s.change))
            .collect::<Result<Vec<f64>>>()?;

        let changepoints = match self.threshold {
            Some(threshold) => {
                threshold_changepoints(&scores, threshold, ChangeType::StructuralChange)
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ScoreKind;

    fn pipeline(k: usize, t1: usize, t2: usize) -> ChangeFinder {
        ChangeFinder::new(ChangeFinderParameters::new(0.5, k, t1, t2)).unwrap()
    }

    #[test]
    fn test_phases_advance_with_wait_for_fill() {
        let mut cf = pipeline(2, 3, 3);
        assert_eq!(cf.phase(), Phase::WarmupStage1);

        let phases: Vec<Phase> = (0..6).map(|i| cf.update(i as f64).unwrap().phase).collect();
        // contexts fill after 2 samples, stage 2 runs from the 3rd, t2 full after the 5th
        assert_eq!(
            phases,
            vec![
                Phase::WarmupStage1,
                Phase::WarmupStage2,
                Phase::WarmupStage2,
                Phase::WarmupStage2,
                Phase::Steady,
                Phase::Steady,
            ]
        );
        assert_eq!(cf.minimum_sample_size(), 5);
        assert_eq!(cf.current_index(), 6);
    }

    #[test]
    fn test_warmup_scores_are_zero() {
        let mut cf = pipeline(3, 3, 3);
        for x in [5.0, -2.0, 7.0] {
            let score = cf.update(x).unwrap();
            assert_eq!(score.outlier, 0.0);
            assert_eq!(score.change, 0.0);
        }
        // stage 1 runs on the 4th sample
        let score = cf.update(100.0).unwrap();
        assert!(score.outlier > 0.0);
    }

    #[test]
    fn test_zero_padded_is_steady_immediately() {
        let params = ChangeFinderParameters::new(0.3, 1, 4, 4).with_warmup(WarmupPolicy::ZeroPadded);
        let mut cf = ChangeFinder::new(params).unwrap();
        assert_eq!(cf.phase(), Phase::Steady);
        assert_eq!(cf.minimum_sample_size(), 1);
        let score = cf.update(3.0).unwrap();
        assert_eq!(score.phase, Phase::Steady);
        assert!(score.outlier > 0.0);
    }

    #[test]
    fn test_invalid_parameters_rejected_at_construction() {
        let err = ChangeFinder::new(ChangeFinderParameters::new(0.5, 0, 7, 7)).unwrap_err();
        assert!(err.is_configuration());
        assert!(ChangeFinder::new(ChangeFinderParameters::new(0.5, 1, 0, 7)).is_err());
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut cf = pipeline(1, 3, 3);
        let xs = [0.1, 0.4, -0.3, 2.0, 0.2, 0.0, 1.1];
        let first: Vec<ChangeFinderScore> = xs.iter().map(|&x| cf.update(x).unwrap()).collect();
        cf.reset();
        assert_eq!(cf.phase(), Phase::WarmupStage1);
        assert_eq!(cf.current_index(), 0);
        let second: Vec<ChangeFinderScore> = xs.iter().map(|&x| cf.update(x).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_finite_sample_leaves_state_alone() {
        let mut cf = pipeline(1, 3, 3);
        cf.update(1.0).unwrap();
        assert!(cf.update(f64::INFINITY).is_err());
        assert_eq!(cf.current_index(), 1);
    }

    #[test]
    fn test_detect_simple_does_not_mutate() {
        let cf = ChangeFinder::new(ChangeFinderParameters::new(0.3, 1, 3, 3))
            .unwrap()
            .with_threshold(0.05);
        let mut series = vec![0.0; 30];
        series.extend(std::iter::repeat(8.0).take(30));
        let result = cf.detect_simple(&series).unwrap();
        assert_eq!(result.statistics().len(), 60);
        assert_eq!(result.algorithm(), "ChangeFinder");
        assert_eq!(cf.current_index(), 0);
        assert!(result.has_changepoints());
        let first = result.changepoints()[0].index;
        assert!(first >= 30, "spurious detection at {first}");

        assert!(cf.detect_simple(&[1.0, 2.0]).unwrap_err().is_configuration());
    }

    #[test]
    fn test_log_loss_pipeline_runs() {
        let params = ChangeFinderParameters::new(0.1, 2, 5, 5).with_score(ScoreKind::LogLoss);
        let mut cf = ChangeFinder::new(params).unwrap();
        for i in 0..50 {
            let score = cf.update((i as f64 * 0.3).sin()).unwrap();
            assert!(score.outlier.is_finite());
            assert!(score.change.is_finite());
        }
    }
}
