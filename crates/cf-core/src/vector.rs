//! Small slice helpers shared by the solvers and detectors

/// Dot product over the common prefix of two slices
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Sum of squares
#[inline]
pub fn sum_sq(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum()
}

/// Euclidean norm
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    sum_sq(a).sqrt()
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter().sum::<f64>() / a.len() as f64
}
