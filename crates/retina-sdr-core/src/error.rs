//! Error types for retina-sdr-core.

use thiserror::Error;

/// Top-level error type for the bit-position algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdrError {
    /// A bitmap or text argument has the wrong shape (unordered, duplicated,
    /// or out of range for its grid).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A tuning parameter is outside its legal range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SdrError {
    fn from(err: serde_json::Error) -> Self {
        SdrError::Serialization(err.to_string())
    }
}

/// Result type alias for core operations.
pub type SdrResult<T> = Result<T, SdrError>;
