//! Turns a Dataset into the feature vector a model artifact expects.
//!
//! The schema shipped with the artifact selects which features get
//! computed; names are parsed into feature specs, so a retrained model can
//! change lags and window sizes without a code change here. Every feature
//! uses only records strictly before the target date, matching the
//! leak-prevention shift applied at training time.

use crate::application::almanac;
use crate::domain::errors::PredictError;
use crate::domain::features::{FeatureSchema, FeatureVector};
use crate::domain::observation::{Dataset, ObservationRecord};
use chrono::{Days, NaiveDate};

/// Input series a historical feature can be derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Series {
    TideAmplitude,
    Temperature,
    Pressure,
    WindSpeed,
    Precipitation,
    CatchRate,
}

impl Series {
    /// Series value for one record. Catch rate is absent on unlabeled days.
    fn value(self, record: &ObservationRecord) -> Option<f64> {
        match self {
            Series::TideAmplitude => Some(record.tide_amplitude()),
            Series::Temperature => Some(record.temperature_c),
            Series::Pressure => Some(record.pressure_hpa),
            Series::WindSpeed => Some(record.wind_speed_ms),
            Series::Precipitation => Some(record.precipitation_mm),
            Series::CatchRate => record.catch_rate(),
        }
    }

    fn from_prefix(name: &str) -> Option<(Series, &str)> {
        const PREFIXES: &[(&str, Series)] = &[
            ("tide_amp_", Series::TideAmplitude),
            ("temp_", Series::Temperature),
            ("pressure_", Series::Pressure),
            ("wind_", Series::WindSpeed),
            ("precip_", Series::Precipitation),
            ("catch_rate_", Series::CatchRate),
        ];
        PREFIXES
            .iter()
            .find_map(|(prefix, series)| name.strip_prefix(prefix).map(|rest| (*series, rest)))
    }
}

/// Date-only features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarFeature {
    DayOfYear,
    Season,
    IsWeekend,
    MonthSin,
    MonthCos,
    MoonPhase,
    MoonPhaseSin,
    MoonPhaseCos,
    IsFullMoon,
    IsNewMoon,
}

/// Parsed form of one schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureSpec {
    Calendar(CalendarFeature),
    /// Series value exactly n days before the target date.
    Lag(Series, u64),
    /// Mean over the n days before the target date (≥1 value).
    Mean(Series, u64),
    /// Sample standard deviation over the window (≥2 values).
    Std(Series, u64),
    /// Sum over the window (≥1 value).
    Sum(Series, u64),
    /// Maximum over the window (≥1 value).
    Max(Series, u64),
    /// Minimum over the window (≥1 value).
    Min(Series, u64),
    /// (lag1 − lag(1+n)) / n, the trailing slope of the series.
    Gradient(Series, u64),
}

impl FeatureSpec {
    fn parse(name: &str) -> Result<Self, PredictError> {
        let calendar = match name {
            "day_of_year" => Some(CalendarFeature::DayOfYear),
            "season" => Some(CalendarFeature::Season),
            "is_weekend" => Some(CalendarFeature::IsWeekend),
            "month_sin" => Some(CalendarFeature::MonthSin),
            "month_cos" => Some(CalendarFeature::MonthCos),
            "moon_phase" => Some(CalendarFeature::MoonPhase),
            "moon_phase_sin" => Some(CalendarFeature::MoonPhaseSin),
            "moon_phase_cos" => Some(CalendarFeature::MoonPhaseCos),
            "is_full_moon" => Some(CalendarFeature::IsFullMoon),
            "is_new_moon" => Some(CalendarFeature::IsNewMoon),
            _ => None,
        };
        if let Some(cal) = calendar {
            return Ok(FeatureSpec::Calendar(cal));
        }

        if let Some((series, rest)) = Series::from_prefix(name) {
            if let Some(n) = parse_days(rest, "lag") {
                return Ok(FeatureSpec::Lag(series, n));
            }
            if let Some(n) = parse_days(rest, "mean") {
                return Ok(FeatureSpec::Mean(series, n));
            }
            if let Some(n) = parse_days(rest, "std") {
                return Ok(FeatureSpec::Std(series, n));
            }
            if let Some(n) = parse_days(rest, "sum") {
                return Ok(FeatureSpec::Sum(series, n));
            }
            if let Some(n) = parse_days(rest, "max") {
                return Ok(FeatureSpec::Max(series, n));
            }
            if let Some(n) = parse_days(rest, "min") {
                return Ok(FeatureSpec::Min(series, n));
            }
            // Trailing slopes: temp_gradient_7d, pressure_trend_3d.
            if let Some(n) = parse_span_days(rest, "gradient_") {
                return Ok(FeatureSpec::Gradient(series, n));
            }
            if let Some(n) = parse_span_days(rest, "trend_") {
                return Ok(FeatureSpec::Gradient(series, n));
            }
        }

        Err(PredictError::Validation {
            reason: format!("unknown feature '{name}' in schema"),
        })
    }

    /// Days of history needed before the target date.
    fn span(&self) -> u64 {
        match self {
            FeatureSpec::Calendar(_) => 0,
            FeatureSpec::Lag(_, n) => *n,
            FeatureSpec::Mean(_, n)
            | FeatureSpec::Std(_, n)
            | FeatureSpec::Sum(_, n)
            | FeatureSpec::Max(_, n)
            | FeatureSpec::Min(_, n) => *n,
            FeatureSpec::Gradient(_, n) => n + 1,
        }
    }
}

fn parse_days(rest: &str, op: &str) -> Option<u64> {
    rest.strip_prefix(op)
        .and_then(|digits| digits.parse::<u64>().ok())
        .filter(|n| *n >= 1)
}

fn parse_span_days(rest: &str, op: &str) -> Option<u64> {
    rest.strip_prefix(op)
        .and_then(|s| s.strip_suffix('d'))
        .and_then(|digits| digits.parse::<u64>().ok())
        .filter(|n| *n >= 1)
}

pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Maximum lag/window span the schema requires, in days. This is the
    /// declared dependency the data loader sizes its window against.
    pub fn required_history(&self, schema: &FeatureSchema) -> Result<usize, PredictError> {
        let mut max_span = 1u64;
        for name in schema.names() {
            max_span = max_span.max(FeatureSpec::parse(name)?.span());
        }
        Ok(max_span as usize)
    }

    /// Produces exactly one feature vector for the target date. Fully
    /// deterministic: same dataset and schema, same vector.
    pub fn build(
        &self,
        dataset: &Dataset,
        target_date: NaiveDate,
        schema: &FeatureSchema,
    ) -> Result<FeatureVector, PredictError> {
        let mut values = Vec::with_capacity(schema.len());
        for name in schema.names() {
            let spec = FeatureSpec::parse(name)?;
            values.push(self.compute(dataset, target_date, name, spec)?);
        }
        FeatureVector::new(schema.clone(), values)
    }

    fn compute(
        &self,
        dataset: &Dataset,
        target: NaiveDate,
        name: &str,
        spec: FeatureSpec,
    ) -> Result<f64, PredictError> {
        match spec {
            FeatureSpec::Calendar(cal) => Ok(match cal {
                CalendarFeature::DayOfYear => almanac::day_of_year(target),
                CalendarFeature::Season => almanac::season(target),
                CalendarFeature::IsWeekend => almanac::is_weekend(target),
                CalendarFeature::MonthSin => almanac::month_sin(target),
                CalendarFeature::MonthCos => almanac::month_cos(target),
                CalendarFeature::MoonPhase => almanac::moon_phase(target),
                CalendarFeature::MoonPhaseSin => almanac::moon_phase_sin(target),
                CalendarFeature::MoonPhaseCos => almanac::moon_phase_cos(target),
                CalendarFeature::IsFullMoon => almanac::is_full_moon(target),
                CalendarFeature::IsNewMoon => almanac::is_new_moon(target),
            }),
            FeatureSpec::Lag(series, n) => self.lag_value(dataset, target, name, series, n),
            FeatureSpec::Mean(series, n) => {
                let values = self.window_values(dataset, target, name, series, n, 1)?;
                Ok(mean(&values))
            }
            FeatureSpec::Std(series, n) => {
                let values = self.window_values(dataset, target, name, series, n, 2)?;
                Ok(sample_std(&values))
            }
            FeatureSpec::Sum(series, n) => {
                let values = self.window_values(dataset, target, name, series, n, 1)?;
                Ok(values.iter().sum())
            }
            FeatureSpec::Max(series, n) => {
                let values = self.window_values(dataset, target, name, series, n, 1)?;
                Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
            FeatureSpec::Min(series, n) => {
                let values = self.window_values(dataset, target, name, series, n, 1)?;
                Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
            }
            FeatureSpec::Gradient(series, n) => {
                let recent = self.lag_value(dataset, target, name, series, 1)?;
                let past = self.lag_value(dataset, target, name, series, n + 1)?;
                Ok((recent - past) / n as f64)
            }
        }
    }

    fn lag_value(
        &self,
        dataset: &Dataset,
        target: NaiveDate,
        name: &str,
        series: Series,
        n: u64,
    ) -> Result<f64, PredictError> {
        let date = back(target, n);
        let record = dataset.on(date).ok_or_else(|| PredictError::DataUnavailable {
            date: target,
            reason: format!("no record at {date} required by feature '{name}'"),
        })?;
        series.value(record).ok_or_else(|| PredictError::DataUnavailable {
            date: target,
            reason: format!("record at {date} has no catch outcome required by feature '{name}'"),
        })
    }

    /// Series values within `[target - n, target - 1]`. Records missing the
    /// series (unlabeled catch days) are skipped; `min_values` guards the
    /// statistic against an effectively empty window.
    fn window_values(
        &self,
        dataset: &Dataset,
        target: NaiveDate,
        name: &str,
        series: Series,
        n: u64,
        min_values: usize,
    ) -> Result<Vec<f64>, PredictError> {
        let from = back(target, n);
        let to = back(target, 1);
        let values: Vec<f64> = dataset
            .between(from, to)
            .iter()
            .filter_map(|r| series.value(r))
            .collect();
        if values.len() < min_values {
            return Err(PredictError::DataUnavailable {
                date: target,
                reason: format!(
                    "feature '{name}' needs at least {min_values} value(s) in [{from}, {to}], found {}",
                    values.len()
                ),
            });
        }
        Ok(values)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn back(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .expect("date arithmetic stays in range")
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1), matching the training pipeline.
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
