//! Composes loader, builder and engine into the per-request pipeline.

use crate::application::data_loader::DataLoader;
use crate::application::feature_builder::FeatureBuilder;
use crate::application::inference::InferenceEngine;
use crate::domain::decision::Decision;
use crate::domain::errors::PredictError;
use chrono::NaiveDate;
use tracing::info;

pub struct PredictionService {
    loader: DataLoader,
    builder: FeatureBuilder,
    engine: InferenceEngine,
    lookback_days: usize,
}

impl PredictionService {
    pub fn new(
        loader: DataLoader,
        builder: FeatureBuilder,
        engine: InferenceEngine,
        lookback_days: usize,
    ) -> Self {
        Self {
            loader,
            builder,
            engine,
            lookback_days,
        }
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Runs loader → builder → engine for one target date. The first
    /// failure short-circuits and propagates unchanged; there are no
    /// partial or best-effort results. Deterministic for an unchanged
    /// store and artifact.
    pub async fn predict_for_date(&self, date: NaiveDate) -> Result<Decision, PredictError> {
        let min_required = self.builder.required_history(self.engine.schema())?;
        let dataset = self
            .loader
            .load_window(date, self.lookback_days, min_required)
            .await?;
        let vector = self.builder.build(&dataset, date, self.engine.schema())?;
        let decision = self.engine.predict(date, &vector)?;

        info!(
            "Decision for {}: {} (score {:.4}, threshold {:.4}, model '{}')",
            decision.date,
            decision.label,
            decision.score,
            decision.threshold,
            self.engine.version()
        );
        Ok(decision)
    }
}
