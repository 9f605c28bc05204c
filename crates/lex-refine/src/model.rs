//! Model scoring on single records.
//!
//! The crate does not load models. Callers inject a [`Predictor`] and the
//! [`Model`] wrapper takes care of turning raw input into a feature vector,
//! rejecting NaN features and reporting every failure as a [`ModelError`].

use crate::error::{ModelError, UtilityError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Turn a record or a list of numbers into a feature vector.
///
/// Objects contribute their values in key order, arrays their elements in
/// order. `null` becomes NaN so that it can be rejected at scoring time.
/// Any other input (strings, booleans, nested values) is unsupported.
pub fn preprocess_input(input: &Value) -> Result<Vec<f64>, UtilityError> {
    let values: Vec<&Value> = match input {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        other => {
            return Err(UtilityError::UnsupportedInput(format!(
                "expected a record or a list, got {}",
                kind(other)
            )));
        }
    };

    values
        .into_iter()
        .map(|value| match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| {
                UtilityError::UnsupportedInput(format!("number {n} is not representable"))
            }),
            Value::Null => Ok(f64::NAN),
            other => Err(UtilityError::UnsupportedInput(format!(
                "feature values must be numbers, got {}",
                kind(other)
            ))),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Scores a feature vector.
///
/// Implementations may fail for any reason; the error is reported through
/// [`ModelError::Predictor`].
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> anyhow::Result<f64>;
}

impl<F> Predictor for F
where
    F: Fn(&[f64]) -> anyhow::Result<f64> + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        self(features)
    }
}

/// A predictor with input preprocessing and NaN checks.
#[derive(Clone)]
pub struct Model {
    predictor: Arc<dyn Predictor>,
}

static_assertions::assert_impl_all!(Model: Send, Sync);

impl Model {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Preprocess raw input and score it.
    pub fn predict(&self, input: &Value) -> Result<f64, ModelError> {
        let features = preprocess_input(input).map_err(|e| {
            error!("Prediction failed: {}", e);
            ModelError::from(e)
        })?;
        self.predict_features(&features)
    }

    /// Score an already numeric feature vector.
    pub fn predict_features(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.iter().any(|x| x.is_nan()) {
            error!("Prediction failed: input data contains NaN values");
            return Err(ModelError::ContainsNaN);
        }

        let prediction = self.predictor.predict(features).map_err(|e| {
            error!("Prediction failed: {:#}", e);
            ModelError::Predictor(format!("{e:#}"))
        })?;

        debug!("Prediction for {} features: {}", features.len(), prediction);
        Ok(prediction)
    }
}
