use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Go / no-go recommendation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Go,
    NoGo,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Go => write!(f, "go"),
            Recommendation::NoGo => write!(f, "no-go"),
        }
    }
}

/// Final pipeline output for one target date. Created fresh per request,
/// never persisted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub date: NaiveDate,
    pub label: Recommendation,
    /// Conservative score the label was derived from (raw model output
    /// times the bias factor).
    pub score: f64,
    /// Raw model output before the bias factor.
    pub raw_score: f64,
    /// Threshold the score was compared against.
    pub threshold: f64,
}
