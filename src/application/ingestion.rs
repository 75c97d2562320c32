//! Daily ingestion job: raw scrape exports → observation records.
//!
//! This is the collaborator that populates the store the prediction
//! pipeline reads. It runs on the daily scrape cadence (or as a one-time
//! backfill) and is the only writer of observation keys.

use crate::application::data_loader::record_key;
use crate::domain::observation::{CatchRecord, ObservationRecord};
use crate::domain::ports::ObjectStore;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// One row of the daily scrape export (`raw/{date}.csv`, headed CSV).
/// Catch columns are blank on days the facility published no counts.
#[derive(Debug, Deserialize)]
struct RawDailyRow {
    date: NaiveDate,
    tide_high_m: f64,
    tide_low_m: f64,
    temperature_c: f64,
    wind_speed_ms: f64,
    pressure_hpa: f64,
    precipitation_mm: f64,
    catch_count: Option<u32>,
    anglers: Option<u32>,
}

pub struct IngestionService {
    store: Arc<dyn ObjectStore>,
    raw_prefix: String,
    records_prefix: String,
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        raw_prefix: impl Into<String>,
        records_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            raw_prefix: raw_prefix.into(),
            records_prefix: records_prefix.into(),
        }
    }

    /// Ingests one day's raw export into an observation record. Fails when
    /// the export is missing or malformed; re-ingesting a day replaces the
    /// stored record.
    pub async fn ingest_day(&self, date: NaiveDate) -> Result<ObservationRecord> {
        let raw_key = format!("{}{}.csv", self.raw_prefix, date);
        let Some(bytes) = self.store.get(&raw_key).await? else {
            bail!("no raw export at '{raw_key}'");
        };

        let record = parse_raw_export(&bytes, date)
            .with_context(|| format!("Failed to parse raw export {raw_key}"))?;

        let key = record_key(&self.records_prefix, record.date);
        if self.store.get(&key).await?.is_some() {
            info!("Replacing existing observation {key}");
        }
        let json = serde_json::to_vec(&record).context("Failed to serialize observation")?;
        self.store.put(&key, &json).await?;

        info!(
            "Ingested observation for {} (catch recorded: {})",
            record.date,
            record.catch.is_some()
        );
        Ok(record)
    }

    /// Ingests every day in `[start, end]`. Days with no raw export are
    /// skipped with a warning; a missing scrape day must not abort a
    /// backfill. Returns the number of records written.
    pub async fn backfill(&self, start: NaiveDate, end: NaiveDate) -> Result<usize> {
        if start > end {
            bail!("backfill range is inverted: {start} > {end}");
        }
        let mut ingested = 0usize;
        let mut date = start;
        while date <= end {
            let raw_key = format!("{}{}.csv", self.raw_prefix, date);
            if self.store.get(&raw_key).await?.is_none() {
                warn!("No raw export for {date}; skipping");
            } else {
                self.ingest_day(date).await?;
                ingested += 1;
            }
            date = date.succ_opt().context("backfill ran past the calendar")?;
        }
        info!("Backfill complete: {ingested} day(s) ingested");
        Ok(ingested)
    }
}

fn parse_raw_export(bytes: &[u8], expected_date: NaiveDate) -> Result<ObservationRecord> {
    let mut reader = csv::Reader::from_reader(bytes);
    let row: RawDailyRow = reader
        .deserialize()
        .next()
        .context("raw export has no data row")??;

    if row.date != expected_date {
        bail!("raw export dated {} but key named {expected_date}", row.date);
    }

    let catch = match (row.catch_count, row.anglers) {
        (Some(count), Some(anglers)) => Some(CatchRecord { count, anglers }),
        (None, None) => None,
        _ => bail!("raw export for {expected_date} has only one of catch_count/anglers"),
    };

    Ok(ObservationRecord {
        date: row.date,
        tide_high_m: row.tide_high_m,
        tide_low_m: row.tide_low_m,
        temperature_c: row.temperature_c,
        wind_speed_ms: row.wind_speed_ms,
        pressure_hpa: row.pressure_hpa,
        precipitation_mm: row.precipitation_mm,
        catch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryObjectStore;

    const HEADER: &str = "date,tide_high_m,tide_low_m,temperature_c,wind_speed_ms,pressure_hpa,precipitation_mm,catch_count,anglers\n";

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn store_with_raw(date: &str, row: &str) -> Arc<InMemoryObjectStore> {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert(&format!("raw/{date}.csv"), format!("{HEADER}{row}\n"));
        store
    }

    #[tokio::test]
    async fn test_ingest_day_writes_observation_json() {
        let store = store_with_raw(
            "2025-06-01",
            "2025-06-01,1.8,0.4,19.5,3.2,1011.0,0.0,120,59",
        );
        let service = IngestionService::new(store.clone(), "raw/", "observations/");

        let record = service.ingest_day(d("2025-06-01")).await.unwrap();
        assert_eq!(record.catch.unwrap().count, 120);
        assert!((record.tide_amplitude() - 1.4).abs() < 1e-12);

        let stored = store
            .get("observations/2025-06-01.json")
            .await
            .unwrap()
            .unwrap();
        let parsed: ObservationRecord = serde_json::from_slice(&stored).unwrap();
        assert_eq!(parsed, record);
    }

    #[tokio::test]
    async fn test_blank_catch_columns_become_unlabeled_record() {
        let store = store_with_raw("2025-06-01", "2025-06-01,1.8,0.4,19.5,3.2,1011.0,0.0,,");
        let service = IngestionService::new(store, "raw/", "observations/");

        let record = service.ingest_day(d("2025-06-01")).await.unwrap();
        assert!(record.catch.is_none());
    }

    #[tokio::test]
    async fn test_mismatched_date_fails() {
        let store = store_with_raw(
            "2025-06-01",
            "2025-06-02,1.8,0.4,19.5,3.2,1011.0,0.0,120,59",
        );
        let service = IngestionService::new(store, "raw/", "observations/");
        assert!(service.ingest_day(d("2025-06-01")).await.is_err());
    }

    #[tokio::test]
    async fn test_backfill_skips_missing_days() {
        let store = store_with_raw(
            "2025-06-01",
            "2025-06-01,1.8,0.4,19.5,3.2,1011.0,0.0,120,59",
        );
        store.insert(
            "raw/2025-06-03.csv",
            format!("{HEADER}2025-06-03,1.7,0.5,20.0,2.8,1012.0,1.5,80,44\n"),
        );
        let service = IngestionService::new(store.clone(), "raw/", "observations/");

        let ingested = service
            .backfill(d("2025-06-01"), d("2025-06-03"))
            .await
            .unwrap();
        assert_eq!(ingested, 2);
        assert!(store.get("observations/2025-06-02.json").await.unwrap().is_none());
    }
}
