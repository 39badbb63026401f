//! Lanczos tridiagonalization of a symmetric matrix

use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Relative size of the residual at which the Krylov space counts as exhausted
const BREAKDOWN_TOLERANCE: f64 = 1e-10;

/// Reduce symmetric `c` to an `s × s` tridiagonal matrix from `start`
///
/// Three-term recurrence: each new Lanczos vector is orthogonalized against
/// the previous two only, so orthogonality degrades over many steps; keep
/// `s` small. The start vector is normalized first. When the residual
/// vanishes (the Krylov space is invariant, or `start` is zero) the
/// recurrence stops and the remaining entries of `T` stay zero.
pub fn lanczos(c: &DMatrix<f64>, start: &DVector<f64>, s: usize) -> DMatrix<f64> {
    let n = start.len();
    let mut t = DMatrix::zeros(s, s);

    let start_norm = start.norm();
    if start_norm == 0.0 || s == 0 {
        debug!("lanczos started from a zero vector");
        return t;
    }

    let mut q = start / start_norm;
    let mut q_prev = DVector::zeros(n);
    let mut beta_prev = 0.0;

    for j in 0..s {
        let cq = c * &q;
        let alpha = q.dot(&cq);
        let r = &cq - &q * alpha - &q_prev * beta_prev;
        let beta = r.norm();

        t[(j, j)] = alpha;
        if j + 1 == s {
            break;
        }
        if beta <= BREAKDOWN_TOLERANCE * cq.norm().max(f64::MIN_POSITIVE) {
            debug!(step = j, "lanczos breakdown, invariant subspace reached");
            break;
        }
        t[(j, j + 1)] = beta;
        t[(j + 1, j)] = beta;

        q_prev = q;
        q = r / beta;
        beta_prev = beta;
    }

    t
}
