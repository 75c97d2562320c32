pub mod almanac;
pub mod data_loader;
pub mod feature_builder;
pub mod inference;
pub mod ingestion;
pub mod orchestrator;
pub mod smartcore_model;

pub use data_loader::DataLoader;
pub use feature_builder::FeatureBuilder;
pub use inference::{InferenceEngine, ModelSettings};
pub use ingestion::IngestionService;
pub use orchestrator::PredictionService;
pub use smartcore_model::SmartCoreModel;
