use crate::domain::errors::PredictError;

/// Ordered list of feature names a model artifact expects.
///
/// The order MUST match exactly the column order used when the model was
/// trained; it ships with the artifact (`selected_features` in the model
/// settings document) and is never invented by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A fixed-width feature row: schema names paired positionally with finite
/// values. Construction is the only place values enter inference, so the
/// finiteness check lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Result<Self, PredictError> {
        if schema.len() != values.len() {
            return Err(PredictError::Validation {
                reason: format!(
                    "schema has {} names but {} values were produced",
                    schema.len(),
                    values.len()
                ),
            });
        }
        for (name, value) in schema.names().iter().zip(&values) {
            if !value.is_finite() {
                return Err(PredictError::Validation {
                    reason: format!("feature '{name}' is not finite ({value})"),
                });
            }
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Positional lookup by name, for tests and diagnostics.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema
            .names()
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}
