//! JSON shapes exchanged with the training backend.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `GET /health`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct HealthResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Body of `GET /status`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_loaded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub training_state: TrainingSnapshot,
}

/// The backend's view of the current (or last) training job.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TrainingSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub training: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_epoch: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_epochs: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loss_history: Vec<LossPoint>,
    #[serde(default)]
    pub final_loss: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LossPoint {
    pub epoch: u32,
    pub loss: f64,
}

/// Body of a successful `POST /upload`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub n_samples: Option<u64>,
    #[serde(default)]
    pub n_features: Option<u64>,
    #[serde(default)]
    pub data_shape: Option<DataShape>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DataShape {
    #[serde(rename = "X", default)]
    pub features: Vec<u64>,
    #[serde(rename = "y", default)]
    pub labels: Vec<u64>,
}

/// Body of `POST /train`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainRequest {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub hidden_layers: Vec<u32>,
    /// Width of the first hidden layer, for backends that derive the stack from one size.
    pub hidden_size: u32,
}

/// Body of a successful `POST /train`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TrainResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Body of `POST /predict`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictRequest {
    pub feature_vector: [f64; 5],
}

/// Body of a successful `POST /predict`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Body of the `DELETE` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
