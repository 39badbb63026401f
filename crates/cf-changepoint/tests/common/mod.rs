//! Shared utilities for integration tests
#![allow(dead_code)]

pub use approx::assert_relative_eq;

use cf_changepoint::{ChangeFinder, ChangeFinderParameters};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `before` samples from N(0, 1) followed by `after` samples from N(level, 1)
pub fn level_shift(rng: &mut ChaCha8Rng, before: usize, after: usize, level: f64) -> Vec<f64> {
    let low = Normal::new(0.0, 1.0).unwrap();
    let high = Normal::new(level, 1.0).unwrap();
    let mut series: Vec<f64> = (0..before).map(|_| low.sample(rng)).collect();
    series.extend((0..after).map(|_| high.sample(rng)));
    series
}

/// Change score per sample averaged over independent replications of a level shift
pub fn averaged_change_scores(
    params: &ChangeFinderParameters,
    replications: usize,
    seed: u64,
) -> Vec<f64> {
    let mut rng = rng(seed);
    let mut totals = vec![0.0; 100];
    for _ in 0..replications {
        let mut finder = ChangeFinder::new(params.clone()).unwrap();
        for (t, x) in level_shift(&mut rng, 50, 50, 10.0).into_iter().enumerate() {
            totals[t] += finder.update(x).unwrap().change;
        }
    }
    totals.iter().map(|s| s / replications as f64).collect()
}

pub fn sine(n: usize, period: f64, phase: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * std::f64::consts::PI * i as f64 / period + phase).sin())
        .collect()
}

pub fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
