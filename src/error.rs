//! Error types for the risk pipeline

use thiserror::Error;

/// Errors raised while loading data, training or classifying.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The training resource cannot be read or does not match the expected schema.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A submitted record violates its declared domain.
    #[error("invalid input: field `{field}` {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The classifier could not be fitted.
    #[error("training failed: {0}")]
    TrainingFailure(String),
}

impl PipelineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PipelineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::DataUnavailable(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
