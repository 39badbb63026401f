//! Shifted QR eigen-decomposition specialised to symmetric tridiagonal matrices

use nalgebra::{DMatrix, DVector};

/// Eigenvalues and accumulated eigenvectors of a tridiagonal matrix
#[derive(Debug, Clone)]
pub struct TridiagonalEigen {
    /// Diagonal of the final iterate, in no particular order
    pub values: DVector<f64>,
    /// Columns are the eigenvectors matching `values`
    pub vectors: DMatrix<f64>,
    /// QR steps performed
    pub iterations: usize,
    /// Whether every off-diagonal entry fell below the tolerance
    pub converged: bool,
}

impl TridiagonalEigen {
    /// Column indices of the `r` largest eigenvalues, largest first
    pub fn top_indices(&self, r: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[b].total_cmp(&self.values[a]));
        order.truncate(r);
        order
    }
}

/// Reflection vector `u` with `(I - 2uuᵀ)[x0, x1]ᵀ = [∓‖x‖, 0]ᵀ`
///
/// `None` when `x` is the zero vector, in which case no reflection is needed.
fn householder2(x0: f64, x1: f64) -> Option<[f64; 2]> {
    let norm = x0.hypot(x1);
    if norm == 0.0 {
        return None;
    }
    let sign = if x0 >= 0.0 { 1.0 } else { -1.0 };
    let head = x0 + sign * norm;
    let len = head.hypot(x1);
    Some([head / len, x1 / len])
}

/// Apply `I - 2uuᵀ` to rows `i` and `i + 1` of `m`
fn reflect_rows(m: &mut DMatrix<f64>, i: usize, u: [f64; 2]) {
    for col in 0..m.ncols() {
        let d = u[0] * m[(i, col)] + u[1] * m[(i + 1, col)];
        m[(i, col)] -= 2.0 * u[0] * d;
        m[(i + 1, col)] -= 2.0 * u[1] * d;
    }
}

/// QR factorization `T = Q R` of a tridiagonal matrix with 2×2 Householder reflections
pub fn tridiagonal_qr(t: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = t.nrows();
    let mut r = t.clone();
    let mut qt = DMatrix::identity(n, n);

    for i in 0..n.saturating_sub(1) {
        if let Some(u) = householder2(r[(i, i)], r[(i + 1, i)]) {
            reflect_rows(&mut r, i, u);
            reflect_rows(&mut qt, i, u);
        }
    }

    (qt.transpose(), r)
}

/// Whether every off-diagonal entry of `a` is below `tol` in magnitude
pub fn is_diagonal(a: &DMatrix<f64>, tol: f64) -> bool {
    a.iter()
        .enumerate()
        .all(|(idx, &x)| idx % a.nrows() == idx / a.nrows() || x.abs() < tol)
}

/// Eigenvalue of the trailing 2×2 block `[[a, b], [b, c]]` closest to `c`
fn wilkinson_shift(a: f64, b: f64, c: f64) -> f64 {
    if b == 0.0 {
        return c;
    }
    let d = (a - c) / 2.0;
    let sign = if d >= 0.0 { 1.0 } else { -1.0 };
    c - sign * b * b / (d.abs() + d.hypot(b))
}

/// Eigen-decompose symmetric tridiagonal `t` with at most `max_iter` QR steps
///
/// Each step factors the leading unreduced block shifted by its Wilkinson
/// shift, replaces it by `R Q + μI` and accumulates `Q` into the eigenvector
/// matrix. A trailing off-diagonal entry below `tol` is zeroed and its row
/// deflated.
pub fn tridiag_eig(t: &DMatrix<f64>, max_iter: usize, tol: f64) -> TridiagonalEigen {
    let n = t.nrows();
    let mut current = t.clone();
    let mut vectors = DMatrix::identity(n, n);
    let mut iterations = 0;
    let mut active = n;

    while active > 1 {
        let last = active - 1;
        if current[(last, last - 1)].abs() < tol {
            current[(last, last - 1)] = 0.0;
            current[(last - 1, last)] = 0.0;
            active = last;
            continue;
        }
        if iterations == max_iter {
            break;
        }

        let mu = wilkinson_shift(
            current[(last - 1, last - 1)],
            current[(last, last - 1)],
            current[(last, last)],
        );
        let block = DMatrix::from_fn(active, active, |i, j| {
            current[(i, j)] - if i == j { mu } else { 0.0 }
        });
        let (q, r) = tridiagonal_qr(&block);
        let next = r * &q;
        for i in 0..active {
            for j in 0..active {
                current[(i, j)] = next[(i, j)] + if i == j { mu } else { 0.0 };
            }
        }
        let rotated: DMatrix<f64> = DMatrix::<f64>::from_fn(n, active, |i, j| vectors[(i, j)]) * q;
        for i in 0..n {
            for j in 0..active {
                vectors[(i, j)] = rotated[(i, j)];
            }
        }
        iterations += 1;
    }

    TridiagonalEigen {
        values: current.diagonal(),
        vectors,
        iterations,
        converged: is_diagonal(&current, tol),
    }
}
