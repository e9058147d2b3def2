//! Scripted backend for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::*;

/// A request observed by [`ScriptedBackend`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Health,
    Status,
    Upload(String),
    Train(TrainRequest),
    Predict([f64; 5]),
    Reset,
    DeleteModel,
}

/// Answers each endpoint from a script and records every call.
pub(crate) struct ScriptedBackend {
    statuses: Mutex<VecDeque<Result<StatusResponse, ApiError>>>,
    last_status: Mutex<Result<StatusResponse, ApiError>>,
    health: Mutex<Result<HealthResponse, ApiError>>,
    upload: Mutex<Result<UploadResponse, ApiError>>,
    train: Mutex<Result<TrainResponse, ApiError>>,
    predict: Mutex<Result<PredictResponse, ApiError>>,
    reset: Mutex<Result<MessageResponse, ApiError>>,
    delete_model: Mutex<Result<MessageResponse, ApiError>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(Ok(StatusResponse::default())),
            health: Mutex::new(Ok(HealthResponse {
                status: "healthy".to_string(),
            })),
            upload: Mutex::new(Ok(UploadResponse::default())),
            train: Mutex::new(Ok(TrainResponse {
                message: "Model training started in the background.".to_string(),
                job_id: Some("job-1".to_string()),
            })),
            predict: Mutex::new(Ok(PredictResponse {
                prediction: 0.0,
                confidence: None,
            })),
            reset: Mutex::new(Ok(MessageResponse::default())),
            delete_model: Mutex::new(Ok(MessageResponse::default())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue status answers; once drained the last one keeps repeating.
    pub(crate) fn with_statuses(self, statuses: Vec<Result<StatusResponse, ApiError>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_health(self, result: Result<HealthResponse, ApiError>) -> Self {
        *self.health.lock().unwrap() = result;
        self
    }

    pub(crate) fn with_upload(self, result: Result<UploadResponse, ApiError>) -> Self {
        *self.upload.lock().unwrap() = result;
        self
    }

    pub(crate) fn with_train(self, result: Result<TrainResponse, ApiError>) -> Self {
        *self.train.lock().unwrap() = result;
        self
    }

    pub(crate) fn with_predict(self, result: Result<PredictResponse, ApiError>) -> Self {
        *self.predict.lock().unwrap() = result;
        self
    }

    pub(crate) fn with_reset(self, result: Result<MessageResponse, ApiError>) -> Self {
        *self.reset.lock().unwrap() = result;
        self
    }

    pub(crate) fn with_delete_model(self, result: Result<MessageResponse, ApiError>) -> Self {
        *self.delete_model.lock().unwrap() = result;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| std::mem::discriminant(*seen) == std::mem::discriminant(call))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for ScriptedBackend {
    fn health(&self) -> Result<HealthResponse, ApiError> {
        self.record(Call::Health);
        self.health.lock().unwrap().clone()
    }

    fn status(&self) -> Result<StatusResponse, ApiError> {
        self.record(Call::Status);
        let mut queue = self.statuses.lock().unwrap();
        let mut last = self.last_status.lock().unwrap();
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        last.clone()
    }

    fn upload(&self, dataset: &DatasetFile) -> Result<UploadResponse, ApiError> {
        self.record(Call::Upload(dataset.file_name.clone()));
        self.upload.lock().unwrap().clone()
    }

    fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ApiError> {
        self.record(Call::Train(request.clone()));
        self.train.lock().unwrap().clone()
    }

    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError> {
        self.record(Call::Predict(request.feature_vector));
        self.predict.lock().unwrap().clone()
    }

    fn reset(&self) -> Result<MessageResponse, ApiError> {
        self.record(Call::Reset);
        self.reset.lock().unwrap().clone()
    }

    fn delete_model(&self) -> Result<MessageResponse, ApiError> {
        self.record(Call::DeleteModel);
        self.delete_model.lock().unwrap().clone()
    }
}

/// A `/status` body with the given readiness flags.
pub(crate) fn status(data_loaded: bool, model_loaded: bool) -> StatusResponse {
    StatusResponse {
        data_loaded,
        model_loaded,
        model_name: model_loaded.then(|| "my_nn_model".to_string()),
        ..StatusResponse::default()
    }
}

/// A `/status` body carrying a training snapshot.
pub(crate) fn training_status(snapshot: TrainingSnapshot) -> StatusResponse {
    StatusResponse {
        data_loaded: true,
        model_loaded: snapshot.final_loss.is_some(),
        training_state: snapshot,
        ..StatusResponse::default()
    }
}

pub(crate) fn offline() -> ApiError {
    ApiError::Transport("Connection refused".to_string())
}
