//! Configuration loading from environment variables.
//!
//! Storage locations, the lookback window and the optional decision
//! threshold override are all externally supplied; nothing here is
//! hard-coded into the pipeline.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the filesystem object store.
    pub store_root: PathBuf,
    /// Key prefix for per-day observation records.
    pub records_prefix: String,
    /// Key prefix for raw daily scrape exports (ingestion input).
    pub raw_prefix: String,
    /// Key of the serialized model artifact.
    pub model_key: String,
    /// Key of the model settings document (feature schema, threshold,
    /// bias factor) deployed alongside the artifact.
    pub model_settings_key: String,
    /// Days of history the data loader fetches per request.
    pub lookback_days: usize,
    /// Optional override of the decision threshold shipped with the model.
    pub decision_threshold: Option<f64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_root = env::var("FISHCAST_STORE_ROOT").unwrap_or_else(|_| "./store".to_string());
        let records_prefix =
            env::var("FISHCAST_RECORDS_PREFIX").unwrap_or_else(|_| "observations/".to_string());
        let raw_prefix = env::var("FISHCAST_RAW_PREFIX").unwrap_or_else(|_| "raw/".to_string());
        let model_key =
            env::var("FISHCAST_MODEL_KEY").unwrap_or_else(|_| "models/model.json".to_string());
        let model_settings_key = env::var("FISHCAST_MODEL_SETTINGS_KEY")
            .unwrap_or_else(|_| "models/settings.json".to_string());

        let lookback_days = Self::parse_usize("FISHCAST_LOOKBACK_DAYS", 30)?;

        let decision_threshold = match env::var("FISHCAST_DECISION_THRESHOLD") {
            Ok(raw) => Some(
                raw.parse::<f64>()
                    .context("Failed to parse FISHCAST_DECISION_THRESHOLD as a float")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            store_root: PathBuf::from(store_root),
            records_prefix,
            raw_prefix,
            model_key,
            model_settings_key,
            lookback_days,
            decision_threshold,
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        match env::var(key) {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("Failed to parse {key} as an integer")),
            Err(_) => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var mutation is process-global, so all cases run in one test to
    // avoid parallel-test interference.
    #[test]
    fn test_from_env_defaults_and_threshold_parsing() {
        unsafe {
            env::remove_var("FISHCAST_LOOKBACK_DAYS");
            env::remove_var("FISHCAST_DECISION_THRESHOLD");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.records_prefix, "observations/");
        assert!(config.decision_threshold.is_none());

        unsafe {
            env::set_var("FISHCAST_DECISION_THRESHOLD", "not-a-number");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("FISHCAST_DECISION_THRESHOLD"));

        unsafe {
            env::set_var("FISHCAST_DECISION_THRESHOLD", "0.75");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.decision_threshold, Some(0.75));

        unsafe {
            env::remove_var("FISHCAST_DECISION_THRESHOLD");
        }
    }
}
