//! Feature vector validation and prediction requests.

use std::ops::Range;

use rand::Rng;

use crate::backend::{Action, ApiError, Backend, PredictRequest};

/// Number of input features the model expects.
pub const FEATURE_COUNT: usize = 5;

/// Range sampled by [`FeatureForm::random`].
pub const SAMPLE_RANGE: Range<f64> = -2.0..2.0;

/// Raw text of the five feature inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureForm(pub [String; FEATURE_COUNT]);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FeatureInputError {
    #[error("Please fill in all 5 input fields")]
    MissingField,
    #[error("All inputs must be valid numbers")]
    NotANumber,
}

impl FeatureForm {
    pub fn from_values(values: [&str; FEATURE_COUNT]) -> Self {
        Self(values.map(str::to_string))
    }

    /// Five values drawn from [`SAMPLE_RANGE`], rounded to three decimals.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(std::array::from_fn(|_| {
            let value = rng.random_range(SAMPLE_RANGE);
            // `+ 0.0` turns a rounded `-0` into `0`.
            let rounded = (value * 1000.0).round() / 1000.0 + 0.0;
            rounded.to_string()
        }))
    }

    /// Empty fields are reported before unparseable ones.
    pub fn parse(&self) -> Result<FeatureVector, FeatureInputError> {
        if self.0.iter().any(|field| field.trim().is_empty()) {
            return Err(FeatureInputError::MissingField);
        }
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(&self.0) {
            *slot = field
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(FeatureInputError::NotANumber)?;
        }
        Ok(FeatureVector(values))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub prediction: f64,
    pub confidence: Option<f64>,
}

impl Prediction {
    /// Backend confidence, or `default` when it reported none.
    pub fn confidence_or(&self, default: Option<f64>) -> Option<f64> {
        self.confidence.or(default)
    }
}

/// Why a prediction could not be shown.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Input(#[from] FeatureInputError),
    #[error("{}", .0.user_message(Action::Predict))]
    Api(#[from] ApiError),
}

/// `POST /predict` with an already validated vector.
pub fn submit(backend: &dyn Backend, vector: FeatureVector) -> Result<Prediction, ApiError> {
    let response = backend.predict(&PredictRequest {
        feature_vector: vector.0,
    })?;
    tracing::info!("Prediction {:.4} for {:?}", response.prediction, vector.0);
    Ok(Prediction {
        prediction: response.prediction,
        confidence: response.confidence,
    })
}

/// Validate `form`, then submit it. Invalid input never reaches the backend.
pub fn predict(backend: &dyn Backend, form: &FeatureForm) -> Result<Prediction, PredictError> {
    let vector = form.parse()?;
    Ok(submit(backend, vector)?)
}
