//! Error types for encoder operations.

use retina_sdr_core::SdrError;
use thiserror::Error;

/// Encoder-specific errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncoderError {
    /// Text or bitmap argument has the wrong shape. Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A parameter is outside its legal range (e.g. retina scaling).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The bitmap source could not encode a term or document.
    ///
    /// `encode` recovers from this through its fallback chain.
    #[error("Encoding unavailable for '{subject}': {reason}")]
    EncodingUnavailable { subject: String, reason: String },

    /// No usable credential or source configuration at construction.
    #[error("Configuration missing: {message}")]
    ConfigurationMissing { message: String },

    /// Configuration file could not be read, parsed or written.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EncoderError {
    /// Shorthand for [`EncoderError::EncodingUnavailable`].
    pub fn unavailable(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EncodingUnavailable {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Whether the fallback chain may recover from this error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::EncodingUnavailable { .. })
    }
}

impl From<SdrError> for EncoderError {
    fn from(err: SdrError) -> Self {
        match err {
            SdrError::InvalidInput(message) => Self::InvalidInput(message),
            SdrError::InvalidConfiguration(message) => Self::InvalidConfiguration(message),
            SdrError::Serialization(message) => Self::Serialization(message),
        }
    }
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;
