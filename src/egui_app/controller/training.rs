use super::*;
use crate::backend::{Action, ApiError, StatusResponse, TrainResponse};
use crate::training::{PollStep, PollerState};

impl EguiController {
    pub fn training_request_in_progress(&self) -> bool {
        self.jobs.train_request_in_progress
    }

    pub fn training_polling(&self) -> bool {
        self.jobs.training_polling()
    }

    /// Validate the form and send `POST /train`. Invalid input never leaves the app,
    /// and nothing is sent before the first status refresh.
    pub fn start_training(&mut self) {
        if !self.session.state().is_ready() {
            self.ui.training.notice = Some(StatusNotice::new(CHECKING_STATUS, StatusTone::Busy));
            return;
        }
        let bounds = self.settings.training.bounds();
        let request = match self.poller.start(&self.ui.training.form, &bounds) {
            Ok(request) => request,
            Err(err) => {
                self.ui.training.notice = Some(StatusNotice::error(err.to_string()));
                return;
            }
        };
        self.remember_training_form();
        let backend = Arc::clone(&self.backend);
        let spawned = self.jobs.spawn_request("train", move || {
            JobMessage::TrainStarted(backend.train(&request))
        });
        match spawned {
            Ok(()) => {
                self.jobs.train_request_in_progress = true;
                self.ui.training.notice =
                    Some(StatusNotice::new("Starting training…", StatusTone::Busy));
            }
            Err(err) => {
                self.poller.train_rejected(err.clone());
                self.ui.training.notice = Some(StatusNotice::error(err));
            }
        }
    }

    pub(super) fn finish_train_request(&mut self, result: Result<TrainResponse, ApiError>) {
        self.jobs.train_request_in_progress = false;
        if self.poller.state() != PollerState::Starting {
            tracing::debug!("Ignoring training response for a discarded run");
            return;
        }
        match result {
            Ok(response) => {
                self.poller.train_accepted(response);
                let message = self
                    .poller
                    .run()
                    .map(|run| run.message.clone())
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "Training started".to_string());
                self.ui.training.notice = Some(StatusNotice::info(message));
                self.jobs.start_training_polling(
                    Arc::clone(&self.backend),
                    self.poller.tick_sequence(),
                    self.settings.polling.training_interval(),
                );
                self.request_status_refresh();
            }
            Err(err) => {
                let message = err.user_message(Action::Train);
                self.poller.train_rejected(message.clone());
                self.ui.training.notice = Some(StatusNotice::error(message));
            }
        }
    }

    pub(super) fn apply_training_tick(&mut self, seq: u64, result: Result<StatusResponse, ApiError>) {
        let status = match result {
            Ok(status) => status,
            Err(err) => {
                self.poller.tick_failed(&err);
                return;
            }
        };
        if self.poller.apply_status(seq, &status.training_state) == PollStep::Continue {
            return;
        }
        self.jobs.stop_training_polling();
        match self.poller.state() {
            PollerState::Complete => {
                let loss = self
                    .poller
                    .run()
                    .and_then(|run| run.final_loss)
                    .unwrap_or_default();
                self.ui.training.notice = Some(StatusNotice::success(format!(
                    "Training complete. Final loss: {loss:.6}"
                )));
                self.request_status_refresh();
            }
            PollerState::Failed => {
                let error = self.poller.error().unwrap_or("Training failed").to_string();
                self.ui.training.notice = Some(StatusNotice::error(error));
            }
            _ => {}
        }
    }
}
