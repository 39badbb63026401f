//! Burg's method: AR estimation straight from the samples

use cf_core::vector::{dot, sum_sq};
use cf_core::{Error, Result};

/// Estimate order-`k` error-filter coefficients from raw samples
///
/// Minimizes the summed forward and backward prediction errors one order at
/// a time. Each reflection coefficient is `g = 2 Σ f·b / (Σ f² + Σ b²)`, with
/// `g = 0` when both error sequences vanish (all-zero input gives all-zero
/// coefficients).
///
/// The result follows the error-filter sign convention,
/// `x_t + a_1 x_{t-1} + ... + a_k x_{t-k} = e_t`, so `[1, 2, 3, 4, 5]`
/// gives roughly `[-1.864, 0.957]`. Negate it to get prediction
/// coefficients comparable to [`levinson_durbin`](super::levinson_durbin);
/// [`ArSolver::Burg`](super::ArSolver::Burg) does that.
///
/// Needs at least `k + 1` samples.
pub fn burg(x: &[f64], k: usize) -> Result<Vec<f64>> {
    if k == 0 {
        return Err(Error::Configuration("AR order must be at least 1".to_string()));
    }
    let n = x.len();
    if n < k + 1 {
        return Err(Error::InsufficientData {
            expected: k + 1,
            actual: n,
        });
    }

    // forward and backward prediction errors
    let mut f: Vec<f64> = x[1..].to_vec();
    let mut b: Vec<f64> = x[..n - 1].to_vec();

    // stored newest reflection first
    let mut a: Vec<f64> = Vec::with_capacity(k);

    for i in 0..k {
        let denominator = sum_sq(&f) + sum_sq(&b);
        let g = if denominator == 0.0 {
            0.0
        } else {
            2.0 * dot(&f, &b) / denominator
        };

        let mut next = Vec::with_capacity(i + 1);
        next.push(g);
        next.extend((0..i).map(|j| a[j] - g * a[i - 1 - j]));
        a = next;

        // shrink both error sequences by one sample
        let m = f.len();
        if m == 0 {
            continue;
        }
        let new_f: Vec<f64> = (1..m).map(|j| f[j] - g * b[j]).collect();
        let new_b: Vec<f64> = (0..m - 1).map(|j| b[j] - g * f[j]).collect();
        f = new_f;
        b = new_b;
    }

    a.reverse();
    Ok(a.into_iter().map(|x| -x).collect())
}
