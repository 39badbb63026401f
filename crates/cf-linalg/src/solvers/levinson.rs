//! Levinson-Durbin recursion for symmetric Toeplitz systems

use super::check_autocovariance;
use cf_core::vector::dot;
use cf_core::Result;
use tracing::debug;

/// Solve the Yule-Walker equations in O(k²) by order recursion
///
/// Returns `a_1..a_k` with `toeplitz(c[0..k]) a = c[1..=k]`, the same
/// solution as [`yule_walker_direct`](super::yule_walker_direct) for
/// well-conditioned input. `c[0] == 0` (a constant series) yields all zeros.
/// A prediction error that collapses to exactly zero mid-recursion stops the
/// order update: higher reflection coefficients are taken as 0.
pub fn levinson_durbin(c: &[f64], k: usize) -> Result<Vec<f64>> {
    check_autocovariance(c, k)?;

    if c[0] == 0.0 {
        debug!("zero variance, returning zero AR coefficients");
        return Ok(vec![0.0; k]);
    }

    // error-filter coefficients, negated on return
    let mut a = Vec::with_capacity(k);
    let mut g = -c[1] / c[0];
    a.push(g);
    let mut v = c[0] * (1.0 - g * g);

    let mut next = Vec::with_capacity(k);
    for t in 1..k {
        g = if v == 0.0 {
            0.0
        } else {
            // a · c[t], ..., c[1]
            let acc: f64 = a.iter().enumerate().map(|(i, ai)| ai * c[t - i]).sum();
            -(c[t + 1] + acc) / v
        };

        next.clear();
        next.extend((0..t).map(|i| a[i] + g * a[t - 1 - i]));
        next.push(g);
        std::mem::swap(&mut a, &mut next);

        v *= 1.0 - g * g;
    }

    Ok(a.into_iter().map(|x| -x).collect())
}

/// Innovation variance `c[0] - Σ a_i c[i]` left by coefficients `a`
pub fn residual_variance(c: &[f64], a: &[f64]) -> f64 {
    c[0] - dot(a, &c[1..])
}
