//! Fetches the observation window a prediction needs from the object store.

use crate::domain::errors::PredictError;
use crate::domain::observation::{Dataset, ObservationRecord};
use crate::domain::ports::ObjectStore;
use anyhow::Context;
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tracing::warn;

/// Storage key for one day's observation record.
pub fn record_key(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}{date}.json")
}

pub struct DataLoader {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl DataLoader {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Loads the records dated in `[target - lookback, target - 1]`.
    ///
    /// `min_required` is the feature builder's declared maximum lag/window
    /// span; fewer surviving records fail with `DataUnavailable` instead of
    /// silently corrupting lag and aggregate features downstream.
    pub async fn load_window(
        &self,
        target_date: NaiveDate,
        lookback_days: usize,
        min_required: usize,
    ) -> Result<Dataset, PredictError> {
        let lookback = lookback_days.max(min_required) as u64;
        let from = target_date
            .checked_sub_days(Days::new(lookback))
            .ok_or_else(|| PredictError::Validation {
                reason: format!("lookback of {lookback} days underflows from {target_date}"),
            })?;
        let to = target_date
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| PredictError::Validation {
                reason: format!("no prior day exists for {target_date}"),
            })?;

        let keys = self.store.list(&self.prefix).await?;

        let mut records = Vec::new();
        for key in keys {
            let Some(date) = self.date_of_key(&key) else {
                warn!("Skipping record key with unrecognized name: {key}");
                continue;
            };
            if date < from || date > to {
                continue;
            }
            let bytes = self
                .store
                .get(&key)
                .await?
                .with_context(|| format!("record {key} vanished between list and get"))?;
            let record: ObservationRecord = serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse observation record {key}"))?;
            if record.date != date {
                warn!(
                    "Record {key} carries mismatched date {}; using the stored value",
                    record.date
                );
            }
            records.push(record);
        }

        let dataset = Dataset::new(records)?;
        if dataset.len() < min_required {
            return Err(PredictError::DataUnavailable {
                date: target_date,
                reason: format!(
                    "have {} of {} required records in [{from}, {to}]",
                    dataset.len(),
                    min_required
                ),
            });
        }
        Ok(dataset)
    }

    fn date_of_key(&self, key: &str) -> Option<NaiveDate> {
        key.strip_prefix(&self.prefix)?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }
}
