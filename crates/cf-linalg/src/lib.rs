//! Linear algebra for streaming change detection
//!
//! Two groups of routines live here:
//!
//! - [`solvers`]: Yule-Walker / AR(k) coefficient estimation, selectable
//!   through [`ArSolver`]
//! - [`spectral`]: power iteration, Lanczos and a tridiagonal QR
//!   eigensolver, enough to approximate the SST score without a full SVD
//!
//! # Example
//!
//! ```rust
//! use cf_linalg::{levinson_durbin, yule_walker_direct};
//!
//! let c = [3.0, 2.0, 1.0];
//! let fast = levinson_durbin(&c, 2).unwrap();
//! let direct = yule_walker_direct(&c, 2).unwrap();
//! assert!((fast[0] - direct[0]).abs() < 1e-12);
//! assert!((fast[1] - direct[1]).abs() < 1e-12);
//! ```

pub mod solvers;
pub mod spectral;

pub use solvers::{
    burg, levinson_durbin, residual_variance, toeplitz, yule_walker_direct, ArEstimator, ArInput,
    ArSolver, Burg, DirectToeplitz, LevinsonDurbin,
};
pub use spectral::{lanczos, power_iteration, tridiag_eig, SingularTriplet, TridiagonalEigen};
