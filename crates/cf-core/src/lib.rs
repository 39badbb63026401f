//! Core types for streaming outlier and change-point detection
//!
//! This crate holds the pieces every other changefinder crate shares:
//!
//! - [`Error`] / [`Result`]: one error taxonomy for configuration problems,
//!   bad input and upstream data errors
//! - [`FixedWindow`]: bounded FIFO buffer used for AR context and score smoothing
//! - [`SeedPolicy`]: explicit seeding of initial model state
//!
//! # Example
//!
//! ```rust
//! use cf_core::FixedWindow;
//!
//! let mut window = FixedWindow::new(3).unwrap();
//! for x in [1.0, 2.0, 3.0, 4.0] {
//!     window.push(x);
//! }
//! assert_eq!(window.to_vec(), vec![2.0, 3.0, 4.0]);
//! assert_eq!(window.mean(), 3.0);
//! ```

pub mod error;
pub mod seed;
pub mod vector;
pub mod window;

// Re-export core types
pub use error::{ensure_finite, Error, Result};
pub use seed::{SeedPolicy, SeedSource};
pub use window::FixedWindow;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::{FixedWindow, Result, SeedPolicy};
}
