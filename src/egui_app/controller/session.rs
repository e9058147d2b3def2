use super::*;
use crate::backend::{Action, ApiError, HealthResponse, MessageResponse};

impl EguiController {
    /// One-off `/status` refresh outside the regular cadence.
    pub fn request_status_refresh(&mut self) {
        let ticket = self.session.begin_refresh();
        let backend = Arc::clone(&self.backend);
        let spawned = self.jobs.spawn_request("refresh", move || JobMessage::StatusRefreshed {
            ticket,
            result: backend.status(),
        });
        if let Err(err) = spawned {
            self.ui.banner = Some(StatusNotice::error(err));
        }
    }

    pub(super) fn apply_health(&mut self, result: Result<HealthResponse, ApiError>) {
        let label = match result {
            Ok(health) => health.status,
            Err(err) => {
                tracing::debug!("{}", err.user_message(Action::Health));
                "error".to_string()
            }
        };
        self.ui.home.health = Some(label);
    }

    /// Open the confirmation window for "Clear All".
    pub fn ask_clear_all(&mut self) {
        self.ui.confirm_clear = true;
    }

    pub fn cancel_clear_all(&mut self) {
        self.ui.confirm_clear = false;
    }

    /// "Clear All" is offered once status is known and there is a dataset or model.
    pub fn has_data_to_clear(&self) -> bool {
        let session = self.session.state();
        session.is_ready() && (session.dataset_uploaded || session.model_trained)
    }

    pub fn clear_all_in_progress(&self) -> bool {
        self.jobs.reset_in_progress
    }

    /// `DELETE /reset`; local state is cleared whatever the backend answers.
    pub fn clear_all(&mut self) {
        self.ui.confirm_clear = false;
        if self.jobs.reset_in_progress {
            return;
        }
        tracing::info!("Clearing all backend state");
        let backend = Arc::clone(&self.backend);
        match self
            .jobs
            .spawn_request("reset", move || JobMessage::ResetFinished(backend.reset()))
        {
            Ok(()) => {
                self.jobs.reset_in_progress = true;
                self.ui.banner = Some(StatusNotice::new("Clearing…", StatusTone::Busy));
            }
            Err(err) => self.ui.banner = Some(StatusNotice::error(err)),
        }
    }

    pub(super) fn finish_clear_all(&mut self, result: Result<MessageResponse, ApiError>) {
        self.jobs.reset_in_progress = false;
        self.session.apply_clear_all(&result);
        self.jobs.stop_training_polling();
        self.jobs.train_request_in_progress = false;
        self.poller.discard();
        self.ui.upload.selection = None;
        self.ui.upload.notice = None;
        self.ui.predict.result = None;
        self.ui.predict.notice = None;
        self.ui.training.notice = None;
        self.ui.banner = Some(match result {
            Ok(_) => StatusNotice::success("All data and models cleared"),
            Err(err) => StatusNotice::warning(format!(
                "{}; local state was cleared",
                err.user_message(Action::Reset)
            )),
        });
    }

    pub fn delete_model_in_progress(&self) -> bool {
        self.jobs.delete_in_progress
    }

    /// `DELETE /model`; the model is marked absent whatever the backend answers.
    pub fn delete_model(&mut self) {
        if self.jobs.delete_in_progress {
            return;
        }
        tracing::info!("Deleting trained model");
        let backend = Arc::clone(&self.backend);
        match self.jobs.spawn_request("delete-model", move || {
            JobMessage::ModelDeleted(backend.delete_model())
        }) {
            Ok(()) => self.jobs.delete_in_progress = true,
            Err(err) => self.ui.banner = Some(StatusNotice::error(err)),
        }
    }

    pub(super) fn finish_delete_model(&mut self, result: Result<MessageResponse, ApiError>) {
        self.jobs.delete_in_progress = false;
        self.session.apply_delete_model(&result);
        self.ui.predict.result = None;
        self.ui.banner = Some(match result {
            Ok(_) => StatusNotice::success("Model deleted"),
            Err(err) => StatusNotice::warning(format!(
                "{}; the model is treated as deleted",
                err.user_message(Action::DeleteModel)
            )),
        });
    }
}
