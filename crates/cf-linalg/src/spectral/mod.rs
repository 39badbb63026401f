//! Small spectral primitives used by the iterative SST path
//!
//! - [`power_iteration`]: dominant singular triplet of a trajectory matrix
//! - [`lanczos`]: Krylov tridiagonalization of a symmetric matrix
//! - [`tridiag_eig`]: shifted QR eigen-decomposition of the resulting tridiagonal

mod lanczos;
mod power;
mod tridiagonal;

pub use lanczos::lanczos;
pub use power::{normalize_or_keep, power_iteration, SingularTriplet};
pub use tridiagonal::{is_diagonal, tridiag_eig, tridiagonal_qr, TridiagonalEigen};
