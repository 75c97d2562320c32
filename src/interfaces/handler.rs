//! Invocation handler: loosely-typed JSON payload in, JSON payload out.
//!
//! This is the only contract the function-runtime shim depends on. The
//! payload maps to a validated request struct; errors come back as a
//! structured kind + message, never as a best-guess Decision.

use crate::application::orchestrator::PredictionService;
use crate::domain::decision::Decision;
use crate::domain::errors::PredictError;
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

/// Validated request. `target_date` defaults to tomorrow (UTC).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl PredictRequest {
    pub fn parse(payload: &Value) -> Result<Self, String> {
        // Runtimes deliver an empty invocation as JSON null.
        if payload.is_null() {
            return Ok(Self { target_date: None });
        }
        serde_json::from_value(payload.clone()).map_err(|e| e.to_string())
    }

    pub fn resolved_date(&self) -> NaiveDate {
        self.target_date.unwrap_or_else(default_target_date)
    }
}

/// Tomorrow in UTC, the documented default when the payload names no date.
pub fn default_target_date() -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .expect("calendar does not end tomorrow")
}

/// Handles one invocation end to end. Always returns a response payload;
/// failures are encoded, not thrown past the runtime shim.
pub async fn handle_request(service: &PredictionService, payload: &Value) -> Value {
    let request = match PredictRequest::parse(payload) {
        Ok(req) => req,
        Err(message) => {
            error!("Rejected invocation payload: {message}");
            return error_response(400, "InvalidRequest", &message);
        }
    };

    let date = request.resolved_date();
    match service.predict_for_date(date).await {
        Ok(decision) => success_response(service, &decision),
        Err(err) => {
            error!("Prediction for {date} failed: {err}");
            error_response(500, err.kind(), &err.to_string())
        }
    }
}

fn success_response(service: &PredictionService, decision: &Decision) -> Value {
    json!({
        "statusCode": 200,
        "body": {
            "date": decision.date,
            "label": decision.label,
            "score": decision.score,
            "raw_score": decision.raw_score,
            "threshold": decision.threshold,
            "model_version": service.engine().version(),
        }
    })
}

fn error_response(status: u16, kind: &str, message: &str) -> Value {
    json!({
        "statusCode": status,
        "body": {
            "error": { "kind": kind, "message": message }
        }
    })
}

/// Maps a pipeline error into the same payload shape `handle_request`
/// produces, for callers that fail before a service exists (e.g. model
/// load at startup).
pub fn error_payload(err: &PredictError) -> Value {
    error_response(500, err.kind(), &err.to_string())
}
