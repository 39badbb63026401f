//! Error types for streaming change detection
//!
//! Provides a unified error type for all changefinder crates. Numerical
//! degeneracies (zero variance, singular covariance) are never errors: they
//! resolve to documented sentinel values inside the algorithms.

use thiserror::Error;

/// Core error type for change detection operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid detector or model configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed data handed over by a sample source
    #[error("Upstream data error: {0}")]
    Upstream(String),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create a configuration error for a parameter outside its allowed range
    pub fn out_of_range(name: &str, value: impl std::fmt::Display, allowed: &str) -> Self {
        Self::Configuration(format!("{name} = {value} must be {allowed}"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }

    /// Whether this error is a fatal configuration problem.
    ///
    /// Too few samples for a batch operation counts as configuration: the
    /// caller chose a window or range that cannot work.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InsufficientData { .. })
    }
}

/// Fails with [`Error::non_finite`] when any value is NaN or infinite
pub fn ensure_finite(data: &[f64], context: &str) -> Result<()> {
    if data.iter().any(|x| !x.is_finite()) {
        return Err(Error::non_finite(context));
    }
    Ok(())
}
