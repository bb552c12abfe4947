//! Marker Error Types
//!
//! [`MarkerError`] covers the failures that can occur while configuring the
//! comparators, aggregating scores and persisting the grade report.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//!
//! fn check_weight(weight: f64) -> Result<(), MarkerError> {
//!     if weight < 0.0 {
//!         return Err(MarkerError::WeightMismatch(format!("negative weight {weight}")));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Represents all error types that can occur in the marker system.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// A test weight is negative or not a number.
    #[error("invalid weight: {0}")]
    WeightMismatch(String),
    /// A tolerance profile is unusable (negative, non-finite or inverted bounds).
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),
    /// The report file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
