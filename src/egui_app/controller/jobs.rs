use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::backend::{
    ApiError, Backend, HealthResponse, MessageResponse, StatusResponse, TrainResponse,
};
use crate::prediction::Prediction;
use crate::schedule::{PeriodicTask, RequestSequence, TaskHandle};
use crate::session::{RefreshTicket, TicketSource};
use crate::upload::{UploadError, UploadOutcome};

/// Results reported back to the UI thread.
pub(crate) enum JobMessage {
    StatusRefreshed {
        ticket: RefreshTicket,
        result: Result<StatusResponse, ApiError>,
    },
    HealthChecked(Result<HealthResponse, ApiError>),
    UploadFinished(Result<UploadOutcome, UploadError>),
    TrainStarted(Result<TrainResponse, ApiError>),
    TrainingTick {
        seq: u64,
        result: Result<StatusResponse, ApiError>,
    },
    PredictionFinished(Result<Prediction, ApiError>),
    ResetFinished(Result<MessageResponse, ApiError>),
    ModelDeleted(Result<MessageResponse, ApiError>),
}

/// Worker threads, periodic tasks, and the channel they report through.
pub(crate) struct ControllerJobs {
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    status_task: Option<TaskHandle>,
    training_task: Option<TaskHandle>,
    pub(super) upload_in_progress: bool,
    pub(super) train_request_in_progress: bool,
    pub(super) predict_in_progress: bool,
    pub(super) reset_in_progress: bool,
    pub(super) delete_in_progress: bool,
}

impl ControllerJobs {
    pub(super) fn new() -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            message_tx,
            message_rx,
            status_task: None,
            training_task: None,
            upload_in_progress: false,
            train_request_in_progress: false,
            predict_in_progress: false,
            reset_in_progress: false,
            delete_in_progress: false,
        }
    }

    pub(super) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    /// Run `job` on a named worker thread and send its message back.
    pub(super) fn spawn_request<F>(&self, name: &str, job: F) -> Result<(), String>
    where
        F: FnOnce() -> JobMessage + Send + 'static,
    {
        let tx = self.message_tx.clone();
        thread::Builder::new()
            .name(format!("fivedash-{name}"))
            .spawn(move || {
                let _ = tx.send(job());
            })
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("Failed to spawn {name} worker: {err}");
                format!("Could not start background work: {err}")
            })
    }

    /// Poll `/health` and `/status` every `interval` until stopped.
    pub(super) fn start_status_polling(
        &mut self,
        backend: Arc<dyn Backend>,
        tickets: TicketSource,
        interval: Duration,
    ) {
        let tx = self.message_tx.clone();
        let handle = PeriodicTask::new("fivedash-status", interval).spawn(move || {
            if tx
                .send(JobMessage::HealthChecked(backend.health()))
                .is_err()
            {
                return ControlFlow::Break(());
            }
            let ticket = tickets.issue();
            let result = backend.status();
            match tx.send(JobMessage::StatusRefreshed { ticket, result }) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            }
        });
        self.status_task = Some(handle);
    }

    /// Poll training progress every `interval`, starting one interval after the
    /// run was accepted; replaces any previous training task.
    pub(super) fn start_training_polling(
        &mut self,
        backend: Arc<dyn Backend>,
        sequence: RequestSequence,
        interval: Duration,
    ) {
        self.stop_training_polling();
        let tx = self.message_tx.clone();
        let handle = PeriodicTask::new("fivedash-training", interval)
            .delay_first_tick()
            .spawn(move || {
                let seq = sequence.next();
                let result = backend.status();
                match tx.send(JobMessage::TrainingTick { seq, result }) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                }
            });
        self.training_task = Some(handle);
    }

    pub(super) fn stop_training_polling(&mut self) {
        if let Some(handle) = self.training_task.take() {
            handle.cancel();
        }
    }

    pub(super) fn training_polling(&self) -> bool {
        self.training_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished() && !handle.is_cancelled())
    }

    pub(super) fn status_polling(&self) -> bool {
        self.status_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished() && !handle.is_cancelled())
    }

    /// Any request whose answer the UI is waiting on.
    pub(super) fn busy(&self) -> bool {
        self.upload_in_progress
            || self.train_request_in_progress
            || self.predict_in_progress
            || self.reset_in_progress
            || self.delete_in_progress
    }

    pub(super) fn stop_all(&mut self) {
        self.stop_training_polling();
        if let Some(handle) = self.status_task.take() {
            handle.cancel();
        }
    }
}
