//! End-to-end pipeline tests over in-memory storage.

use chrono::{Days, NaiveDate};
use fishcast::application::{
    DataLoader, FeatureBuilder, InferenceEngine, ModelSettings, PredictionService,
};
use fishcast::domain::decision::Recommendation;
use fishcast::domain::errors::PredictError;
use fishcast::domain::observation::{CatchRecord, ObservationRecord};
use fishcast::domain::ports::Predictor;
use fishcast::infrastructure::InMemoryObjectStore;
use fishcast::interfaces::handler;
use serde_json::json;
use std::sync::Arc;

/// Trivial threshold model: score = first feature value, halved. With a
/// schema of just `tide_amp_mean7`, the score is the normalized trailing
/// tide amplitude (amplitudes stay below 2 m).
struct AmplitudeModel;

impl Predictor for AmplitudeModel {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        Ok(features[0] / 2.0)
    }

    fn name(&self) -> &str {
        "amplitude threshold"
    }
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// 30 days of history before `target`: rising tide amplitude that levels
/// off at `final_amplitude` for the trailing week, stable weather.
fn seed_month(store: &InMemoryObjectStore, target: NaiveDate, final_amplitude: f64) {
    for i in 1..=30u64 {
        let date = target.checked_sub_days(Days::new(i)).unwrap();
        let amplitude = if i <= 7 {
            final_amplitude
        } else {
            // older days: smaller swing, rising toward the trailing week
            final_amplitude * (1.0 - 0.02 * (i - 7) as f64)
        };
        let record = ObservationRecord {
            date,
            tide_high_m: 1.0 + amplitude / 2.0,
            tide_low_m: 1.0 - amplitude / 2.0,
            temperature_c: 18.0,
            wind_speed_ms: 3.0,
            pressure_hpa: 1013.0,
            precipitation_mm: 0.0,
            catch: Some(CatchRecord {
                count: 90,
                anglers: 44,
            }),
        };
        store.insert(
            &format!("observations/{date}.json"),
            serde_json::to_vec(&record).unwrap(),
        );
    }
}

fn amplitude_service(store: Arc<InMemoryObjectStore>) -> PredictionService {
    let settings = ModelSettings {
        selected_features: vec!["tide_amp_mean7".to_string()],
        threshold: 0.5,
        bias_factor: 1.0,
        version: "e2e".to_string(),
    };
    let engine = InferenceEngine::new(Box::new(AmplitudeModel), settings, None).unwrap();
    PredictionService::new(
        DataLoader::new(store, "observations/"),
        FeatureBuilder::new(),
        engine,
        30,
    )
}

#[tokio::test]
async fn test_high_trailing_amplitude_means_go() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    seed_month(&store, target, 1.4); // score 0.7

    let decision = amplitude_service(store)
        .predict_for_date(target)
        .await
        .unwrap();
    assert_eq!(decision.label, Recommendation::Go);
    assert!((decision.score - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn test_low_trailing_amplitude_means_no_go() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    seed_month(&store, target, 0.6); // score 0.3

    let decision = amplitude_service(store)
        .predict_for_date(target)
        .await
        .unwrap();
    assert_eq!(decision.label, Recommendation::NoGo);
}

#[tokio::test]
async fn test_score_exactly_at_threshold_means_go() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    seed_month(&store, target, 1.0); // trailing mean exactly 1.0, score 0.5

    let decision = amplitude_service(store)
        .predict_for_date(target)
        .await
        .unwrap();
    assert_eq!(decision.score, 0.5);
    assert_eq!(decision.label, Recommendation::Go);
}

#[tokio::test]
async fn test_repeat_predictions_are_bit_identical() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    seed_month(&store, target, 1.3);
    let service = amplitude_service(store);

    let first = service.predict_for_date(target).await.unwrap();
    let second = service.predict_for_date(target).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_insufficient_history_surfaces_as_data_unavailable() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    // Only 3 days of history against a 7-day trailing window.
    for i in 1..=3u64 {
        let date = target.checked_sub_days(Days::new(i)).unwrap();
        let record = ObservationRecord {
            date,
            tide_high_m: 1.6,
            tide_low_m: 0.4,
            temperature_c: 18.0,
            wind_speed_ms: 3.0,
            pressure_hpa: 1013.0,
            precipitation_mm: 0.0,
            catch: None,
        };
        store.insert(
            &format!("observations/{date}.json"),
            serde_json::to_vec(&record).unwrap(),
        );
    }

    let err = amplitude_service(store)
        .predict_for_date(target)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "DataUnavailable");
}

#[tokio::test]
async fn test_handler_returns_structured_error_payload() {
    let store = Arc::new(InMemoryObjectStore::new());
    let service = amplitude_service(store); // empty store

    let response =
        handler::handle_request(&service, &json!({"target_date": "2025-07-01"})).await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(response["body"]["error"]["kind"], "DataUnavailable");
    assert!(
        response["body"]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("2025-07-01")
    );
}

#[tokio::test]
async fn test_handler_success_payload_shape() {
    let store = Arc::new(InMemoryObjectStore::new());
    let target = d("2025-07-01");
    seed_month(&store, target, 1.4);
    let service = amplitude_service(store);

    let response =
        handler::handle_request(&service, &json!({"target_date": "2025-07-01"})).await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["body"]["date"], "2025-07-01");
    assert_eq!(response["body"]["label"], "go");
    assert_eq!(response["body"]["threshold"], 0.5);
    assert_eq!(response["body"]["model_version"], "e2e");
}

#[tokio::test]
async fn test_handler_rejects_malformed_payload() {
    let store = Arc::new(InMemoryObjectStore::new());
    let service = amplitude_service(store);

    let response =
        handler::handle_request(&service, &json!({"target_date": "next tuesday"})).await;

    assert_eq!(response["statusCode"], 400);
    assert_eq!(response["body"]["error"]["kind"], "InvalidRequest");
}
