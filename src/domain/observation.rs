use crate::domain::errors::PredictError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recorded catch outcome for a day. Absent on unlabeled days
/// (future dates, days the scrape produced no counts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchRecord {
    /// Total fish landed at the facility that day.
    pub count: u32,
    /// Anglers present that day.
    pub anglers: u32,
}

impl CatchRecord {
    /// Catch per angler. The +1 matches the training pipeline and keeps
    /// zero-visitor days finite.
    pub fn rate(&self) -> f64 {
        f64::from(self.count) / (f64::from(self.anglers) + 1.0)
    }
}

/// One calendar day's raw environmental facts. Written once by the
/// ingestion job, read-only to the prediction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub date: NaiveDate,
    /// Daily high-tide level in meters.
    pub tide_high_m: f64,
    /// Daily low-tide level in meters.
    pub tide_low_m: f64,
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
    pub pressure_hpa: f64,
    pub precipitation_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch: Option<CatchRecord>,
}

impl ObservationRecord {
    /// Tide swing for the day, the main tide-derived signal.
    pub fn tide_amplitude(&self) -> f64 {
        self.tide_high_m - self.tide_low_m
    }

    pub fn catch_rate(&self) -> Option<f64> {
        self.catch.map(|c| c.rate())
    }
}

/// Time-indexed sequence of observations: ascending dates, no duplicates,
/// gaps allowed. Rebuilt per request, never mutated in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<ObservationRecord>,
}

impl Dataset {
    /// Builds a dataset from records in any order. Duplicate dates are a
    /// storage-integrity fault and are rejected rather than deduplicated.
    pub fn new(mut records: Vec<ObservationRecord>) -> Result<Self, PredictError> {
        records.sort_by_key(|r| r.date);
        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(PredictError::Validation {
                    reason: format!("duplicate observation for {}", pair[0].date),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for an exact date, if present.
    pub fn on(&self, date: NaiveDate) -> Option<&ObservationRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records dated within `[from, to]` inclusive, ascending.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> &[ObservationRecord] {
        let start = self.records.partition_point(|r| r.date < from);
        let end = self.records.partition_point(|r| r.date <= to);
        &self.records[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> ObservationRecord {
        ObservationRecord {
            date: date.parse().unwrap(),
            tide_high_m: 1.8,
            tide_low_m: 0.4,
            temperature_c: 18.0,
            wind_speed_ms: 3.0,
            pressure_hpa: 1013.0,
            precipitation_mm: 0.0,
            catch: Some(CatchRecord {
                count: 120,
                anglers: 59,
            }),
        }
    }

    #[test]
    fn test_dataset_sorts_ascending() {
        let ds = Dataset::new(vec![
            record("2025-06-03"),
            record("2025-06-01"),
            record("2025-06-02"),
        ])
        .unwrap();

        let dates: Vec<_> = ds.records().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-06-01", "2025-06-02", "2025-06-03"]);
    }

    #[test]
    fn test_dataset_rejects_duplicate_dates() {
        let err = Dataset::new(vec![record("2025-06-01"), record("2025-06-01")]).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_between_respects_gaps() {
        let ds = Dataset::new(vec![
            record("2025-06-01"),
            record("2025-06-02"),
            record("2025-06-05"),
        ])
        .unwrap();

        let window = ds.between("2025-06-02".parse().unwrap(), "2025-06-05".parse().unwrap());
        assert_eq!(window.len(), 2);
        assert!(ds.on("2025-06-03".parse().unwrap()).is_none());
    }

    #[test]
    fn test_catch_rate_uses_plus_one_denominator() {
        let c = CatchRecord {
            count: 120,
            anglers: 59,
        };
        assert!((c.rate() - 2.0).abs() < 1e-12);
    }
}
