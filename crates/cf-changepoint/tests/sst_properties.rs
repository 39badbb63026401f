//! Range and no-change properties of both SST paths

mod common;

use cf_changepoint::{Sst, SstParameters};
use common::*;
use proptest::prelude::*;
use rand::Rng;

fn random_window(seed: u64, len: usize, offset: f64) -> Vec<f64> {
    let mut rng = rng(seed);
    (0..len).map(|_| rng.gen::<f64>() * 4.0 - 2.0 + offset).collect()
}

proptest! {
    #[test]
    fn scores_stay_in_unit_interval(
        seed in 0u64..10_000,
        w in 2usize..10,
        rank_pick in 0usize..10,
        offset in 0.0f64..5.0,
        iterative in any::<bool>(),
    ) {
        let rank = 1 + rank_pick % w;
        let mut params = SstParameters::new(w, rank);
        if iterative {
            params = params.iterative();
        }
        let mut sst = Sst::new(params).unwrap();
        let past = random_window(seed, 2 * w, 0.0);
        let current = random_window(seed + 1, 2 * w, offset);
        let score = sst.score(&past, &current).unwrap();
        prop_assert!((0.0..=1.0).contains(&score), "score {}", score);
    }

    #[test]
    fn exact_identical_windows_score_zero(seed in 0u64..10_000, w in 2usize..10, rank_pick in 0usize..10) {
        let rank = 1 + rank_pick % w;
        let mut sst = Sst::new(SstParameters::new(w, rank)).unwrap();
        let x = random_window(seed, 2 * w, 0.0);
        let score = sst.score(&x, &x).unwrap();
        prop_assert!(score < 1e-8, "score {}", score);
    }

    #[test]
    fn iterative_identical_windows_score_zero(seed in 0u64..10_000, w in 2usize..13, rank_pick in 0usize..10) {
        let rank = 1 + rank_pick % w;
        let mut sst = Sst::new(SstParameters::new(w, rank).iterative()).unwrap();
        let x = random_window(seed, 2 * w, 0.0);
        let score = sst.score(&x, &x).unwrap();
        prop_assert!(score < 1e-6, "score {}", score);
        // the warm-started second call must agree
        let again = sst.score(&x, &x).unwrap();
        prop_assert!(again < 1e-6, "second score {}", again);
    }

    #[test]
    fn iterative_identical_sine_windows_score_zero(
        w in 6usize..13,
        rank in 1usize..3,
        period in 5.0f64..20.0,
        phase in 0.0f64..6.28,
        amplitude in 0.1f64..10.0,
    ) {
        let mut sst = Sst::new(SstParameters::new(w, rank).iterative()).unwrap();
        let x = sine(2 * w, period, phase, amplitude);
        let score = sst.score(&x, &x).unwrap();
        prop_assert!(score < 1e-9, "score {}", score);
    }
}

#[test]
fn iterative_identical_exponential_windows_score_zero() {
    for w in 3..12 {
        for rank in 1..=w {
            let mut sst = Sst::new(SstParameters::new(w, rank).iterative()).unwrap();
            let x: Vec<f64> = (0..2 * w as i32).map(|t| 1.05f64.powi(t)).collect();
            let score = sst.score(&x, &x).unwrap();
            assert!(score < 1e-9, "w={w} rank={rank} score={score}");
        }
    }
}

#[test]
fn both_paths_react_to_a_level_shift() {
    let w = 6;
    let past = sine(2 * w, 12.0, 0.0, 1.0);
    let mut current = sine(w, 12.0, 0.0, 1.0);
    current.extend(random_window(3, w, 5.0));

    for params in [SstParameters::new(w, 2), SstParameters::new(w, 2).iterative()] {
        let mut sst = Sst::new(params).unwrap();
        let same = sst.score(&past, &past).unwrap();
        let shifted = sst.score(&past, &current).unwrap();
        assert!(shifted > same, "shifted {shifted} same {same}");
    }
}

#[test]
fn scan_flags_a_level_shift() {
    let w = 5;
    let mut series = sine(60, 10.0, 0.0, 1.0);
    for x in series.iter_mut().skip(30) {
        *x += 8.0;
    }
    // rank 2 spans a pure sinusoid exactly, so only the shift registers
    let mut sst = Sst::new(SstParameters::new(w, 2)).unwrap();
    let scores = sst.scan(&series).unwrap();
    let before = max_of(&scores[11..20]);
    let around = max_of(&scores[25..36]);
    assert!(before < 1e-6, "before {before}");
    assert!(around > 0.1, "around {around}");
}
