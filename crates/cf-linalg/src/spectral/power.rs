//! Power iteration for the dominant singular triplet

use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Dominant singular value with its left and right singular vectors
#[derive(Debug, Clone, PartialEq)]
pub struct SingularTriplet {
    /// Left singular vector `A v / ‖A v‖`
    pub u: DVector<f64>,
    /// Singular value `‖A v‖`
    pub s: f64,
    /// Right singular vector
    pub v: DVector<f64>,
    /// Steps of `x ← AᵀA x` performed
    pub iterations: usize,
}

/// Approximate the top singular triplet of `a` by iterating `x ← AᵀA x` from `x0`
///
/// The iterate is renormalized every step. Iteration stops once a step moves
/// the unit iterate by at most `tol` or after `max_iter` steps; `tol = 0`
/// always runs the full `max_iter`. A zero iterate ends the iteration: the
/// returned vectors are left unnormalized (zero) and `s` is 0.
pub fn power_iteration(
    a: &DMatrix<f64>,
    x0: &DVector<f64>,
    max_iter: usize,
    tol: f64,
) -> SingularTriplet {
    let ata = a.transpose() * a;

    let mut x = normalize_or_keep(x0.clone());
    let mut iterations = 0;
    while iterations < max_iter {
        let mut next = &ata * &x;
        let norm = next.norm();
        if norm == 0.0 {
            debug!("power iteration reached a zero vector");
            x = next;
            break;
        }
        next /= norm;
        iterations += 1;

        let step = (&next - &x).norm();
        x = next;
        if step <= tol {
            break;
        }
    }

    let v = normalize_or_keep(x);
    let av = a * &v;
    let s = av.norm();
    let u = normalize_or_keep(av);
    SingularTriplet {
        u,
        s,
        v,
        iterations,
    }
}

/// Unit vector in the direction of `x`, or `x` itself when its norm is zero
pub fn normalize_or_keep(mut x: DVector<f64>) -> DVector<f64> {
    let norm = x.norm();
    if norm > 0.0 {
        x /= norm;
    }
    x
}
