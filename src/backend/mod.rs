//! Typed access to the remote training backend.
//!
//! [`Backend`] is the seam every screen and command talks through; the
//! production implementation is [`HttpBackend`], tests substitute a scripted one.

mod error;
mod http;
#[cfg(test)]
pub(crate) mod testing;
mod wire;

pub use error::{Action, ApiError};
pub use http::HttpBackend;
pub use wire::{
    DataShape, HealthResponse, LossPoint, MessageResponse, PredictRequest, PredictResponse,
    StatusResponse, TrainRequest, TrainResponse, TrainingSnapshot, UploadResponse,
};

/// A dataset file read into memory, ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Endpoints exposed by the training backend.
///
/// Calls block until the backend answers or the configured timeout expires.
pub trait Backend: Send + Sync {
    /// `GET /health`
    fn health(&self) -> Result<HealthResponse, ApiError>;
    /// `GET /status`
    fn status(&self) -> Result<StatusResponse, ApiError>;
    /// `POST /upload` as multipart form data with field `file`.
    fn upload(&self, dataset: &DatasetFile) -> Result<UploadResponse, ApiError>;
    /// `POST /train`
    fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ApiError>;
    /// `POST /predict`
    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError>;
    /// `DELETE /reset`
    fn reset(&self) -> Result<MessageResponse, ApiError>;
    /// `DELETE /model`
    fn delete_model(&self) -> Result<MessageResponse, ApiError>;
}
