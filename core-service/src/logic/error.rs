//! Error taxonomy for the classify-and-present pipeline.
//!
//! Every failure is caught at `api::commands` and turned into a message for
//! the user. Nothing here is retried.

use thiserror::Error;

pub type RiskResult<T> = Result<T, RiskError>;

/// Model artifact missing, corrupt or incompatible. Fatal for the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read model artifact {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse model artifact: {0}")]
    Corrupt(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("incompatible model artifact: {0}")]
    Incompatible(String),

    #[error("unsupported model artifact: {0}")]
    Unsupported(String),
}

/// Scaler missing, corrupt or incompatible. Fatal for the request only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    #[error("model expects scaled input but no scaler is configured")]
    Missing,

    #[error("scaler artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read scaler artifact {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse scaler artifact: {0}")]
    Corrupt(String),

    #[error("incompatible scaler artifact: {0}")]
    Incompatible(String),
}

/// Feature vector malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("expected {expected} feature values, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} = {value} is outside the accepted range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a whole number, got {value}")]
    NotInteger { field: &'static str, value: f64 },

    #[error("could not parse '{0}' as a number")]
    Unparsable(String),
}

/// Any failure raised by the model oracle while scoring.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("prediction failed: {0}")]
pub struct PredictionError(pub String);

/// Invalid configuration (bands, theme, paths).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Umbrella error returned by the pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl RiskError {
    /// Short, user-facing text for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            RiskError::ModelLoad(e) => format!("Prediction is unavailable: {}", e),
            RiskError::Normalization(e) => format!("Could not prepare your measurements: {}", e),
            RiskError::InvalidInput(e) => format!("Please check your input: {}", e),
            RiskError::Prediction(e) => format!("Something went wrong while scoring: {}", e),
        }
    }

    /// True when the whole prediction path is down, not just this request
    pub fn is_fatal(&self) -> bool {
        matches!(self, RiskError::ModelLoad(_))
    }
}
