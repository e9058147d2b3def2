use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::{self, AppSettings};
use crate::egui_app::state::*;
use crate::session::{Readiness, SessionCoordinator, SessionState};
use crate::training::TrainingPoller;

mod jobs;
mod predict;
mod session;
mod training;
mod upload;


use jobs::{ControllerJobs, JobMessage};

/// Shown when a page action is attempted before the first status refresh.
pub const CHECKING_STATUS: &str = "Checking backend status…";

/// Maintains app state and bridges the session, poller, and backend to the egui UI.
pub struct EguiController {
    pub ui: UiState,
    backend: Arc<dyn Backend>,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
    session: SessionCoordinator,
    poller: TrainingPoller,
    jobs: ControllerJobs,
}

impl EguiController {
    pub fn new(backend: Arc<dyn Backend>, settings: AppSettings) -> Self {
        let mut ui = UiState::default();
        ui.training.form = settings.training.form();
        Self {
            ui,
            backend,
            settings,
            settings_path: None,
            session: SessionCoordinator::new(),
            poller: TrainingPoller::new(),
            jobs: ControllerJobs::new(),
        }
    }

    /// Persist the training form to `path` whenever a run starts.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Begin the status/health cadence. The first tick fires at once.
    pub fn start_background_polling(&mut self) {
        if self.jobs.status_polling() {
            return;
        }
        tracing::info!(
            "Polling {} every {:?}",
            self.settings.backend.base_url,
            self.settings.polling.status_interval()
        );
        self.jobs.start_status_polling(
            Arc::clone(&self.backend),
            self.session.ticket_source(),
            self.settings.polling.status_interval(),
        );
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn readiness(&self) -> Readiness {
        self.session.readiness()
    }

    pub fn poller(&self) -> &TrainingPoller {
        &self.poller
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Backend API documentation page.
    pub fn api_docs_url(&self) -> String {
        format!("{}/docs", self.settings.backend.base_url)
    }

    /// Waiting on any request, or watching a training run.
    pub fn has_pending_work(&self) -> bool {
        self.jobs.busy() || self.jobs.training_polling()
    }

    /// Switch pages. Leaving the training page ends its run.
    pub fn navigate(&mut self, page: Page) {
        if self.ui.page == page {
            return;
        }
        if self.ui.page == Page::Train {
            self.jobs.stop_training_polling();
            self.jobs.train_request_in_progress = false;
            self.poller.discard();
        }
        tracing::debug!("Navigating to {page:?}");
        self.ui.page = page;
    }

    /// Apply every finished job. Returns whether anything changed.
    pub fn poll_jobs(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.jobs.try_recv_message() {
            changed = true;
            self.handle_job_message(message);
        }
        changed
    }

    fn handle_job_message(&mut self, message: JobMessage) {
        match message {
            JobMessage::StatusRefreshed { ticket, result } => {
                self.session.apply_refresh(ticket, result);
            }
            JobMessage::HealthChecked(result) => self.apply_health(result),
            JobMessage::UploadFinished(result) => self.finish_upload(result),
            JobMessage::TrainStarted(result) => self.finish_train_request(result),
            JobMessage::TrainingTick { seq, result } => self.apply_training_tick(seq, result),
            JobMessage::PredictionFinished(result) => self.finish_prediction(result),
            JobMessage::ResetFinished(result) => self.finish_clear_all(result),
            JobMessage::ModelDeleted(result) => self.finish_delete_model(result),
        }
    }

    /// Cancel background polling.
    pub fn shutdown(&mut self) {
        self.jobs.stop_all();
    }

    fn remember_training_form(&mut self) {
        self.settings.training.remember_form(&self.ui.training.form);
        let Some(path) = self.settings_path.clone() else {
            return;
        };
        // Environment overrides stay in memory; write onto the stored file.
        let result = config::load_from(&path).and_then(|mut stored| {
            stored.training.remember_form(&self.ui.training.form);
            config::save_to_path(&stored, &path)
        });
        if let Err(err) = result {
            tracing::warn!("Could not save training form: {err}");
        }
    }
}

impl Drop for EguiController {
    fn drop(&mut self) {
        self.jobs.stop_all();
    }
}
