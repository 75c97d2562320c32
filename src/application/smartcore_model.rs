//! Predictor backed by a smartcore random-forest regressor.
//!
//! The artifact is the serde-JSON serialization of the trained forest,
//! produced by the offline training pipeline and deployed next to its
//! settings document.

use crate::domain::errors::PredictError;
use crate::domain::ports::Predictor;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

#[derive(Debug)]
pub struct SmartCoreModel {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl SmartCoreModel {
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, PredictError> {
        let model = serde_json::from_slice(bytes).map_err(|e| PredictError::ModelLoad {
            reason: format!("failed to deserialize random-forest artifact: {e}"),
        })?;
        Ok(Self { model })
    }
}

impl Predictor for SmartCoreModel {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let matrix = DenseMatrix::from_2d_vec(&vec![features.to_vec()]).map_err(|e| {
            PredictError::Inference {
                reason: format!("matrix creation failed: {e}"),
            }
        })?;

        let predictions = self
            .model
            .predict(&matrix)
            .map_err(|e| PredictError::Inference {
                reason: format!("model execution failed: {e}"),
            })?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| PredictError::Inference {
                reason: "model returned no prediction".to_string(),
            })
    }

    fn name(&self) -> &str {
        "smartcore random forest"
    }
}
