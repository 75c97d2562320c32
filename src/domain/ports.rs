//! Port traits separating the pipeline from storage and model backends.

use crate::domain::errors::PredictError;
use anyhow::Result;
use async_trait::async_trait;

/// Durable blob storage keyed by logical path. The pipeline only ever
/// needs get/list; put exists for the ingestion job.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a blob. `Ok(None)` means the key does not exist; `Err` is an
    /// I/O or backend fault.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Keys under a prefix, in unspecified order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Write a blob, replacing any existing value.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// A trained scoring model. Implementations wrap whatever serialized
/// artifact was deployed; the pipeline only sees a row of floats in and a
/// single score out.
pub trait Predictor: Send + Sync {
    /// Score one feature row. The row is already validated against the
    /// artifact's schema by the inference engine.
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;

    /// Model name/type for logs and response payloads.
    fn name(&self) -> &str;
}
