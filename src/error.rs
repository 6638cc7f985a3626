//! Error types for the model selection engine
//!
//! A single domain error covers the whole run. Every fatal condition carries
//! its underlying cause, and [`AutomlError::stage`] names the originating
//! stage so callers can tell "no usable model found" apart from
//! infrastructure failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, AutomlError>;

/// Errors that can occur during model selection
#[derive(Debug, Error)]
pub enum AutomlError {
    /// Shape mismatch between matrices/vectors
    #[error("Shape error: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Invalid run configuration (empty registry, malformed grids, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Data loading or conversion error
    #[error("Data error: {0}")]
    DataError(String),

    /// A single model fit failed (recovered locally by the search engine)
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Predict called before fit
    #[error("Model has not been fitted yet")]
    ModelNotFitted,

    /// The best candidate stayed below the quality threshold
    #[error("No model reached the quality threshold (best r2 = {best_score})")]
    InsufficientAccuracy { best_score: f64 },

    /// Experiment tracking failed (reported as a warning, never fatal)
    #[error("Tracking error: {0}")]
    TrackingError(String),

    /// Artifact could not be written or read
    #[error("Persistence error at {path}: {source}")]
    PersistError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AutomlError {
    /// Name of the pipeline stage this error originates from.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ShapeError { .. } | Self::ValidationError(_) | Self::DataError(_) => {
                "configuration"
            }
            Self::TrainingError(_) | Self::ModelNotFitted => "search",
            Self::InsufficientAccuracy { .. } => "selection",
            Self::TrackingError(_) => "tracking",
            Self::PersistError { .. } | Self::SerializationError(_) => "persistence",
        }
    }

    /// True when the run completed but no candidate was good enough, as
    /// opposed to an infrastructure failure.
    pub fn is_model_quality(&self) -> bool {
        matches!(self, Self::InsufficientAccuracy { .. })
    }
}

impl From<bincode::Error> for AutomlError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for AutomlError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = AutomlError::ValidationError("empty registry".into());
        assert_eq!(err.stage(), "configuration");

        let err = AutomlError::InsufficientAccuracy { best_score: 0.4 };
        assert_eq!(err.stage(), "selection");
        assert!(err.is_model_quality());

        let err = AutomlError::PersistError {
            path: PathBuf::from("artifacts/model.pkl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.stage(), "persistence");
        assert!(!err.is_model_quality());
    }

    #[test]
    fn test_display_carries_cause() {
        let err = AutomlError::InsufficientAccuracy { best_score: 0.42 };
        assert!(err.to_string().contains("0.42"));
    }
}
