//! Basic outlier and change-point detection
//!
//! Feeds a synthetic series with a spike and a level shift through
//! ChangeFinder, then scores the same series with both SST paths.

use cf_changepoint::{
    ChangeFinder, ChangeFinderParameters, ModelSelector, SimpleDetector, Sst, SstParameters,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ChangeFinder / SST Demo ===\n");

    let series = create_series(7);

    let selection = ModelSelector::new(10)?.select(&series[..100])?;
    println!(
        "Selected AR order k = {} (AIC = {:.2}) from the first 100 samples",
        selection.order, selection.aic
    );

    let params = ChangeFinderParameters::new(0.05, selection.order, 7, 7).with_r_change(0.025);
    let mut finder = ChangeFinder::new(params)?;

    println!("\n{:>5} {:>9} {:>9} {:>9}  phase", "t", "x", "outlier", "change");
    for (t, &x) in series.iter().enumerate() {
        let score = finder.update(x)?;
        if t % 10 == 0 || (118..=122).contains(&t) || (198..=206).contains(&t) {
            println!(
                "{:>5} {:>9.3} {:>9.4} {:>9.4}  {:?}",
                t, x, score.outlier, score.change, score.phase
            );
        }
    }

    for params in [
        SstParameters::new(10, 3),
        SstParameters::new(10, 3).iterative(),
    ] {
        let sst = Sst::new(params)?.with_threshold(0.3);
        let result = sst.detect_simple(&series)?;
        println!("\n{}", result);
    }

    Ok(())
}

/// Noise around 0, a spike at t = 120, and a shift to 5 from t = 200
fn create_series(seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.5).expect("valid normal");
    (0..300)
        .map(|t| {
            let base = if t < 200 { 0.0 } else { 5.0 };
            let spike = if t == 120 { 8.0 } else { 0.0 };
            base + spike + noise.sample(&mut rng)
        })
        .collect()
}
