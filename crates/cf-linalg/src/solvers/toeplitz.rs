//! Direct solve of the Yule-Walker system through an explicit Toeplitz matrix

use super::check_autocovariance;
use cf_core::Result;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Symmetric Toeplitz matrix with first row `c`
///
/// `T[(i, j)] = c[|i - j|]`
pub fn toeplitz(c: &[f64]) -> DMatrix<f64> {
    let n = c.len();
    DMatrix::from_fn(n, n, |i, j| c[i.abs_diff(j)])
}

/// Solve `C a = c[1..=k]` with `C = toeplitz(c[0..k])` by LU decomposition
///
/// Reference path for the Levinson-Durbin recursion. An all-zero or singular
/// `C`, or a solution with non-finite entries, yields the all-zero vector so
/// the prediction collapses to the mean.
pub fn yule_walker_direct(c: &[f64], k: usize) -> Result<Vec<f64>> {
    check_autocovariance(c, k)?;

    let lags = &c[..k];
    if lags.iter().all(|&x| x == 0.0) {
        debug!("zero autocovariance, returning zero AR coefficients");
        return Ok(vec![0.0; k]);
    }

    let matrix = toeplitz(lags);
    let rhs = DVector::from_column_slice(&c[1..=k]);
    match matrix.lu().solve(&rhs) {
        Some(a) if a.iter().all(|x| x.is_finite()) => Ok(a.iter().copied().collect()),
        _ => {
            debug!(order = k, "singular Toeplitz system, returning zero AR coefficients");
            Ok(vec![0.0; k])
        }
    }
}
