use crate::backend::{Action, ApiError, Backend, MessageResponse, StatusResponse};
use crate::schedule::RequestSequence;

use super::state::{DatasetInfo, Readiness, SessionState};

/// Identifies one status refresh; newer tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Issues refresh tickets from threads that do not own the coordinator.
#[derive(Clone, Debug)]
pub struct TicketSource {
    sequence: RequestSequence,
}

impl TicketSource {
    pub fn issue(&self) -> RefreshTicket {
        RefreshTicket(self.sequence.next())
    }
}

/// What `apply_refresh` did with a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Backend values replaced the local flags.
    Applied,
    /// The request failed; prior values were kept.
    Failed,
    /// A newer refresh or a local write already superseded this response.
    Stale,
}

/// Single writer of [`SessionState`].
///
/// Every refresh ticket and every local write draws from one sequence, so
/// a status response is applied only when nothing newer has touched the state.
#[derive(Debug)]
pub struct SessionCoordinator {
    state: SessionState,
    sequence: RequestSequence,
    last_applied: u64,
    last_local_write: u64,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            sequence: RequestSequence::new(),
            last_applied: 0,
            last_local_write: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn readiness(&self) -> Readiness {
        self.state.readiness()
    }

    pub fn ticket_source(&self) -> TicketSource {
        TicketSource {
            sequence: self.sequence.clone(),
        }
    }

    /// Take a ticket for a refresh about to be sent.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.sequence.next())
    }

    /// Reconcile with a `/status` result. Never fails; errors are logged.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<StatusResponse, ApiError>,
    ) -> RefreshOutcome {
        self.state.loading = false;
        let RefreshTicket(seq) = ticket;
        if seq <= self.last_applied || seq < self.last_local_write {
            tracing::debug!(
                "Discarding stale status response #{seq} (applied #{}, local write #{})",
                self.last_applied,
                self.last_local_write
            );
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(status) => {
                self.last_applied = seq;
                self.state.dataset_uploaded = status.data_loaded;
                self.state.model_trained = status.model_loaded;
                self.state.model_name = status.model_name.filter(|_| status.model_loaded);
                if !status.data_loaded {
                    self.state.dataset_info = None;
                }
                self.state.last_error = None;
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::error!("Error fetching app status: {err}");
                self.state.last_error = Some(err.user_message(Action::Status));
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetch `/status` and reconcile, blocking the caller.
    pub fn refresh_status(&mut self, backend: &dyn Backend) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = backend.status();
        self.apply_refresh(ticket, result)
    }

    /// Optimistic local override used right after an upload succeeds.
    pub fn set_dataset_uploaded(&mut self, uploaded: bool) {
        self.mark_local_write();
        self.state.dataset_uploaded = uploaded;
        if !uploaded {
            self.state.dataset_info = None;
        }
    }

    /// Store what the backend reported about a fresh upload.
    pub fn record_upload(&mut self, info: DatasetInfo) {
        self.set_dataset_uploaded(true);
        self.state.dataset_info = Some(info);
    }

    /// Reset local state after `DELETE /reset`, whatever it returned.
    pub fn apply_clear_all(&mut self, result: &Result<MessageResponse, ApiError>) {
        match result {
            Ok(_) => tracing::info!("Backend state cleared"),
            Err(err) => tracing::warn!("Backend reset failed; clearing local state anyway: {err}"),
        }
        self.mark_local_write();
        self.state.clear();
    }

    /// `DELETE /reset`, then reset local state. The backend result is returned for display only.
    pub fn clear_all(&mut self, backend: &dyn Backend) -> Result<MessageResponse, ApiError> {
        let result = backend.reset();
        self.apply_clear_all(&result);
        result
    }

    /// Mark the model gone after `DELETE /model`, whatever it returned.
    pub fn apply_delete_model(&mut self, result: &Result<MessageResponse, ApiError>) {
        match result {
            Ok(_) => tracing::info!("Trained model deleted"),
            Err(err) => {
                tracing::warn!("Backend model deletion failed; marking model absent anyway: {err}")
            }
        }
        self.mark_local_write();
        self.state.model_trained = false;
        self.state.model_name = None;
    }

    /// `DELETE /model`, then mark the model absent. The backend result is returned for display only.
    pub fn delete_model(&mut self, backend: &dyn Backend) -> Result<MessageResponse, ApiError> {
        let result = backend.delete_model();
        self.apply_delete_model(&result);
        result
    }

    fn mark_local_write(&mut self) {
        self.last_local_write = self.sequence.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, ScriptedBackend, offline, status};

    fn loaded(data: bool, model: bool) -> SessionCoordinator {
        let backend = ScriptedBackend::new().with_statuses(vec![Ok(status(data, model))]);
        let mut coordinator = SessionCoordinator::new();
        coordinator.refresh_status(&backend);
        coordinator
    }

    #[test]
    fn starts_loading_until_first_refresh() {
        let coordinator = SessionCoordinator::new();
        assert!(coordinator.state().loading);
        assert!(!coordinator.state().is_ready());

        let coordinator = loaded(true, false);
        assert!(coordinator.state().is_ready());
        assert_eq!(coordinator.readiness(), Readiness::DataNoModel);
    }

    #[test]
    fn initial_state_comes_from_backend() {
        let coordinator = loaded(true, true);
        assert_eq!(coordinator.readiness(), Readiness::DataModel);
        assert_eq!(coordinator.state().model_name.as_deref(), Some("my_nn_model"));
    }

    #[test]
    fn failed_refresh_keeps_values_and_clears_loading() {
        let backend = ScriptedBackend::new().with_statuses(vec![Ok(status(true, true)), Err(offline())]);
        let mut coordinator = SessionCoordinator::new();
        assert_eq!(coordinator.refresh_status(&backend), RefreshOutcome::Applied);
        assert_eq!(coordinator.refresh_status(&backend), RefreshOutcome::Failed);
        assert_eq!(coordinator.readiness(), Readiness::DataModel);
        assert!(
            coordinator
                .state()
                .last_error
                .as_deref()
                .unwrap()
                .contains("Connection refused")
        );

        let mut fresh = SessionCoordinator::new();
        let failing = ScriptedBackend::new().with_statuses(vec![Err(offline())]);
        assert_eq!(fresh.refresh_status(&failing), RefreshOutcome::Failed);
        assert!(!fresh.state().loading);
        assert_eq!(fresh.readiness(), Readiness::NoDataNoModel);
    }

    #[test]
    fn older_response_never_overwrites_newer_one() {
        let mut coordinator = SessionCoordinator::new();
        let slow = coordinator.begin_refresh();
        let fast = coordinator.begin_refresh();
        assert_eq!(
            coordinator.apply_refresh(fast, Ok(status(true, true))),
            RefreshOutcome::Applied
        );
        assert_eq!(
            coordinator.apply_refresh(slow, Ok(status(false, false))),
            RefreshOutcome::Stale
        );
        assert_eq!(coordinator.readiness(), Readiness::DataModel);
    }

    #[test]
    fn response_issued_before_local_write_is_discarded() {
        let mut coordinator = loaded(false, false);
        let in_flight = coordinator.begin_refresh();
        coordinator.record_upload(DatasetInfo {
            feature_shape: vec![10, 5],
            label_shape: vec![10],
            n_samples: Some(10),
            n_features: Some(5),
        });
        assert_eq!(
            coordinator.apply_refresh(in_flight, Ok(status(false, false))),
            RefreshOutcome::Stale
        );
        assert!(coordinator.state().dataset_uploaded);
        assert!(coordinator.state().dataset_info.is_some());

        let after = coordinator.begin_refresh();
        assert_eq!(
            coordinator.apply_refresh(after, Ok(status(true, false))),
            RefreshOutcome::Applied
        );
        assert!(coordinator.state().dataset_info.is_some());
    }

    #[test]
    fn backend_reporting_no_data_drops_dataset_info() {
        let mut coordinator = loaded(false, false);
        coordinator.record_upload(DatasetInfo::default());
        let ticket = coordinator.begin_refresh();
        coordinator.apply_refresh(ticket, Ok(status(false, false)));
        assert_eq!(coordinator.state().dataset_info, None);
        assert!(!coordinator.state().dataset_uploaded);
    }

    #[test]
    fn ticket_source_shares_sequence() {
        let mut coordinator = SessionCoordinator::new();
        let source = coordinator.ticket_source();
        let remote = source.issue();
        let local = coordinator.begin_refresh();
        assert!(local > remote);
        coordinator.apply_refresh(local, Ok(status(true, false)));
        assert_eq!(
            coordinator.apply_refresh(remote, Ok(status(false, false))),
            RefreshOutcome::Stale
        );
    }

    #[test]
    fn clear_all_resets_even_when_backend_fails() {
        for reset in [Ok(MessageResponse::default()), Err(offline())] {
            let backend = ScriptedBackend::new()
                .with_statuses(vec![Ok(status(true, true))])
                .with_reset(reset.clone());
            let mut coordinator = SessionCoordinator::new();
            coordinator.refresh_status(&backend);
            coordinator.record_upload(DatasetInfo::default());

            let result = coordinator.clear_all(&backend);
            assert_eq!(result.is_ok(), reset.is_ok());
            assert!(!coordinator.state().dataset_uploaded);
            assert!(!coordinator.state().model_trained);
            assert_eq!(coordinator.state().dataset_info, None);
            assert_eq!(coordinator.readiness(), Readiness::NoDataNoModel);
            assert_eq!(backend.count(&Call::Reset), 1);
        }
    }

    #[test]
    fn clear_all_discards_refresh_in_flight() {
        let backend = ScriptedBackend::new();
        let mut coordinator = loaded(true, true);
        let in_flight = coordinator.begin_refresh();
        coordinator.clear_all(&backend).unwrap();
        assert_eq!(
            coordinator.apply_refresh(in_flight, Ok(status(true, true))),
            RefreshOutcome::Stale
        );
        assert_eq!(coordinator.readiness(), Readiness::NoDataNoModel);
    }

    #[test]
    fn delete_model_keeps_dataset() {
        let backend = ScriptedBackend::new().with_delete_model(Err(ApiError::Backend {
            status: 500,
            detail: None,
        }));
        let mut coordinator = loaded(true, true);
        assert!(coordinator.delete_model(&backend).is_err());
        assert_eq!(coordinator.readiness(), Readiness::DataNoModel);
        assert_eq!(coordinator.state().model_name, None);
        assert_eq!(backend.calls(), vec![Call::DeleteModel]);
    }
}
