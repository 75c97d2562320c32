pub mod handler;

pub use handler::{PredictRequest, handle_request};
