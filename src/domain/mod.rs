pub mod decision;
pub mod errors;
pub mod features;
pub mod observation;
pub mod ports;

pub use decision::{Decision, Recommendation};
pub use errors::PredictError;
pub use features::{FeatureSchema, FeatureVector};
pub use observation::{CatchRecord, Dataset, ObservationRecord};
pub use ports::{ObjectStore, Predictor};
