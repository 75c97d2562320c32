//! Inference engine: holds the loaded model artifact for the process
//! lifetime and turns validated feature vectors into Decisions.

use crate::application::smartcore_model::SmartCoreModel;
use crate::config::Config;
use crate::domain::decision::{Decision, Recommendation};
use crate::domain::errors::PredictError;
use crate::domain::features::{FeatureSchema, FeatureVector};
use crate::domain::ports::{ObjectStore, Predictor};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

/// Settings document deployed alongside the model artifact. The feature
/// schema, threshold and bias factor are training-time contracts; this
/// crate consumes them, it never invents them.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Feature names in the exact column order the model was trained on.
    pub selected_features: Vec<String>,
    /// Decision threshold τ: score ≥ τ ⇒ go.
    pub threshold: f64,
    /// Conservative multiplier applied to the raw model output.
    #[serde(default = "default_bias_factor")]
    pub bias_factor: f64,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_bias_factor() -> f64 {
    1.0
}

fn default_version() -> String {
    "unversioned".to_string()
}

pub struct InferenceEngine {
    model: Box<dyn Predictor>,
    schema: FeatureSchema,
    threshold: f64,
    bias_factor: f64,
    version: String,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model", &self.model.name())
            .field("schema", &self.schema)
            .field("threshold", &self.threshold)
            .field("bias_factor", &self.bias_factor)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl InferenceEngine {
    /// Assembles an engine from an already-loaded model. The artifact is
    /// passed in explicitly; there is no hidden global model state.
    pub fn new(
        model: Box<dyn Predictor>,
        settings: ModelSettings,
        threshold_override: Option<f64>,
    ) -> Result<Self, PredictError> {
        if settings.selected_features.is_empty() {
            return Err(PredictError::ModelLoad {
                reason: "model settings declare an empty feature schema".to_string(),
            });
        }
        let threshold = threshold_override.unwrap_or(settings.threshold);
        if !threshold.is_finite() || !settings.bias_factor.is_finite() {
            return Err(PredictError::ModelLoad {
                reason: format!(
                    "non-finite threshold ({}) or bias factor ({})",
                    threshold, settings.bias_factor
                ),
            });
        }
        Ok(Self {
            model,
            schema: FeatureSchema::new(settings.selected_features),
            threshold,
            bias_factor: settings.bias_factor,
            version: settings.version,
        })
    }

    /// Fetches the artifact and its settings from storage, once per
    /// process. Callers keep the engine alive for the process lifetime;
    /// artifact updates arrive via process replacement, not live swap.
    pub async fn load(store: &dyn ObjectStore, config: &Config) -> Result<Self, PredictError> {
        let settings_bytes = store
            .get(&config.model_settings_key)
            .await?
            .ok_or_else(|| PredictError::ModelLoad {
                reason: format!("model settings not found at '{}'", config.model_settings_key),
            })?;
        let settings: ModelSettings =
            serde_json::from_slice(&settings_bytes).map_err(|e| PredictError::ModelLoad {
                reason: format!("failed to parse model settings: {e}"),
            })?;

        let artifact_bytes =
            store
                .get(&config.model_key)
                .await?
                .ok_or_else(|| PredictError::ModelLoad {
                    reason: format!("model artifact not found at '{}'", config.model_key),
                })?;
        let model = SmartCoreModel::from_json_bytes(&artifact_bytes)?;

        let engine = Self::new(Box::new(model), settings, config.decision_threshold)?;
        info!(
            "Loaded model '{}' ({}): {} features, threshold {}",
            engine.version,
            engine.model.name(),
            engine.schema.len(),
            engine.threshold
        );
        Ok(engine)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Scores one feature vector for the given date.
    ///
    /// The vector's key set and order are checked against the artifact
    /// schema first; builder/model version skew must fail loudly here
    /// rather than produce a silently wrong number.
    pub fn predict(
        &self,
        date: NaiveDate,
        vector: &FeatureVector,
    ) -> Result<Decision, PredictError> {
        self.validate_schema(vector.schema())?;

        let raw_score = self.model.predict(vector.values())?;
        if !raw_score.is_finite() {
            return Err(PredictError::Inference {
                reason: format!("model produced a non-finite score ({raw_score})"),
            });
        }

        let score = raw_score * self.bias_factor;
        let label = if score >= self.threshold {
            Recommendation::Go
        } else {
            Recommendation::NoGo
        };

        Ok(Decision {
            date,
            label,
            score,
            raw_score,
            threshold: self.threshold,
        })
    }

    fn validate_schema(&self, got: &FeatureSchema) -> Result<(), PredictError> {
        let expected = self.schema.names();
        let actual = got.names();

        for (i, name) in expected.iter().enumerate() {
            match actual.get(i) {
                Some(a) if a == name => {}
                Some(a) => {
                    return Err(PredictError::SchemaMismatch {
                        reason: format!("position {i}: expected '{name}', got '{a}'"),
                    });
                }
                None => {
                    return Err(PredictError::SchemaMismatch {
                        reason: format!("missing feature '{name}' (position {i})"),
                    });
                }
            }
        }
        if actual.len() > expected.len() {
            return Err(PredictError::SchemaMismatch {
                reason: format!(
                    "unexpected extra feature '{}' (position {})",
                    actual[expected.len()],
                    expected.len()
                ),
            });
        }
        Ok(())
    }
}
