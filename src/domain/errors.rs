use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised along the prediction pipeline.
///
/// Nothing in the pipeline downgrades one of these into a default
/// Decision; every failure propagates to the invocation response.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("data unavailable for {date}: {reason}")]
    DataUnavailable { date: NaiveDate, reason: String },

    #[error("feature validation failed: {reason}")]
    Validation { reason: String },

    #[error("feature schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    #[error("failed to load model artifact: {reason}")]
    ModelLoad { reason: String },

    #[error("inference failed: {reason}")]
    Inference { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PredictError {
    /// Stable machine-readable kind carried in error response payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::DataUnavailable { .. } => "DataUnavailable",
            PredictError::Validation { .. } => "ValidationError",
            PredictError::SchemaMismatch { .. } => "SchemaMismatch",
            PredictError::ModelLoad { .. } => "ModelLoadError",
            PredictError::Inference { .. } => "InferenceError",
            PredictError::Storage(_) => "StorageError",
        }
    }
}
