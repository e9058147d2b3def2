use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::backend::{
    Action, ApiError, Backend, LossPoint, TrainRequest, TrainResponse, TrainingSnapshot,
};
use crate::schedule::{RequestSequence, sleep_unless_cancelled};

use super::validate::{HyperparameterBounds, Hyperparameters, TrainingForm, TrainingInputError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    /// `POST /train` is in flight.
    Starting,
    Polling,
    Complete,
    Failed,
}

impl PollerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// A run is being started or watched.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Polling)
    }
}

/// Whether the owner of the poll loop should keep ticking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStep {
    Continue,
    Finished,
}

/// One training run as observed from the client.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingRun {
    pub params: Hyperparameters,
    pub job_id: Option<String>,
    /// Acknowledgement text from `POST /train`.
    pub message: String,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub loss_history: Vec<LossPoint>,
    pub final_loss: Option<f64>,
    pub error: Option<String>,
    /// A snapshot has been matched to this run.
    observed: bool,
}

impl TrainingRun {
    fn new(params: Hyperparameters) -> Self {
        Self {
            total_epochs: params.epochs,
            params,
            job_id: None,
            message: String::new(),
            current_epoch: 0,
            loss_history: Vec::new(),
            final_loss: None,
            error: None,
            observed: false,
        }
    }

    /// A snapshot describes this run once it is seen training or reports our epoch count.
    fn claims(&mut self, snapshot: &TrainingSnapshot) -> bool {
        if !self.observed {
            self.observed = snapshot.training || snapshot.total_epochs == self.params.epochs;
        }
        self.observed
    }

    /// Fraction of epochs done, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.total_epochs == 0 {
            return 0.0;
        }
        (self.current_epoch as f32 / self.total_epochs as f32).clamp(0.0, 1.0)
    }

    pub fn latest_loss(&self) -> Option<f64> {
        self.final_loss
            .or_else(|| self.loss_history.last().map(|point| point.loss))
    }

    /// Append entries past the last seen epoch; earlier entries are never removed.
    fn merge_losses(&mut self, incoming: &[LossPoint]) {
        let mut last_epoch = self.loss_history.last().map(|point| point.epoch);
        for point in incoming {
            if last_epoch.is_none_or(|epoch| point.epoch > epoch) {
                self.loss_history.push(*point);
                last_epoch = Some(point.epoch);
            }
        }
    }
}

/// Refusal from [`TrainingPoller::start`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TrainingStartError {
    #[error("Training is already in progress")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] TrainingInputError),
}

/// Training screen state machine: `Idle → Starting → Polling → {Complete, Failed}`.
///
/// Status ticks are numbered; a tick older than the last applied one is dropped.
#[derive(Debug)]
pub struct TrainingPoller {
    state: PollerState,
    pending: Option<Hyperparameters>,
    run: Option<TrainingRun>,
    sequence: RequestSequence,
    last_applied: u64,
}

impl Default for TrainingPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingPoller {
    pub fn new() -> Self {
        Self {
            state: PollerState::Idle,
            pending: None,
            run: None,
            sequence: RequestSequence::new(),
            last_applied: 0,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// The current or most recent run.
    pub fn run(&self) -> Option<&TrainingRun> {
        self.run.as_ref()
    }

    /// Failure text to surface, if the last run failed.
    pub fn error(&self) -> Option<&str> {
        match self.state {
            PollerState::Failed => self.run.as_ref().and_then(|run| run.error.as_deref()),
            _ => None,
        }
    }

    /// Sequence used to number ticks issued from other threads.
    pub fn tick_sequence(&self) -> RequestSequence {
        self.sequence.clone()
    }

    /// Validate the form and move to `Starting`. On error nothing changes.
    pub fn start(
        &mut self,
        form: &TrainingForm,
        bounds: &HyperparameterBounds,
    ) -> Result<TrainRequest, TrainingStartError> {
        if self.state.is_active() {
            return Err(TrainingStartError::Busy);
        }
        let params = super::validate(form, bounds)?;
        let request = params.to_request();
        tracing::info!(
            "Starting training: {} epochs, batch {}, lr {}, layers {:?}",
            params.epochs,
            params.batch_size,
            params.learning_rate,
            params.hidden_layers
        );
        self.pending = Some(params);
        self.state = PollerState::Starting;
        Ok(request)
    }

    /// The backend accepted the run; begin polling. Earlier ticks no longer apply.
    pub fn train_accepted(&mut self, response: TrainResponse) {
        let Some(params) = self.pending.take().filter(|_| self.state == PollerState::Starting)
        else {
            tracing::warn!("Ignoring training acknowledgement with no run starting");
            return;
        };
        let mut run = TrainingRun::new(params);
        run.job_id = response.job_id;
        run.message = response.message;
        tracing::info!("Training accepted: {}", run.message);
        self.run = Some(run);
        self.last_applied = self.sequence.current();
        self.state = PollerState::Polling;
    }

    /// The backend refused the run; `message` is surfaced as-is.
    pub fn train_rejected(&mut self, message: String) {
        let Some(params) = self.pending.take().filter(|_| self.state == PollerState::Starting)
        else {
            tracing::warn!("Ignoring training rejection with no run starting");
            return;
        };
        tracing::warn!("Training rejected: {message}");
        let mut run = TrainingRun::new(params);
        run.error = Some(message);
        self.run = Some(run);
        self.state = PollerState::Failed;
    }

    /// Forget the current run and return to `Idle`. Late responses for it are ignored.
    pub fn discard(&mut self) {
        if self.state != PollerState::Idle {
            tracing::debug!("Discarding training run in state {:?}", self.state);
        }
        self.state = PollerState::Idle;
        self.pending = None;
        self.run = None;
        self.last_applied = self.sequence.current();
    }

    /// Number a status tick before it is sent.
    pub fn begin_tick(&self) -> u64 {
        self.sequence.next()
    }

    /// Fold one training snapshot into the run.
    pub fn apply_status(&mut self, seq: u64, snapshot: &TrainingSnapshot) -> PollStep {
        if self.state != PollerState::Polling {
            return if self.state.is_terminal() {
                PollStep::Finished
            } else {
                PollStep::Continue
            };
        }
        if seq <= self.last_applied {
            tracing::debug!("Dropping stale training tick #{seq} (applied #{})", self.last_applied);
            return PollStep::Continue;
        }
        let Some(run) = self.run.as_mut() else {
            return PollStep::Continue;
        };
        self.last_applied = seq;
        if !run.claims(snapshot) {
            tracing::debug!("Ignoring training tick #{seq}: snapshot is from an earlier run");
            return PollStep::Continue;
        }
        run.current_epoch = snapshot.current_epoch;
        if snapshot.total_epochs > 0 {
            run.total_epochs = snapshot.total_epochs;
        }
        run.merge_losses(&snapshot.loss_history);
        tracing::debug!(
            "Training tick #{seq}: epoch {}/{}",
            run.current_epoch,
            run.total_epochs
        );

        if let Some(error) = &snapshot.error {
            tracing::warn!("Training failed: {error}");
            run.error = Some(error.clone());
            self.state = PollerState::Failed;
            return PollStep::Finished;
        }
        if let Some(loss) = snapshot.final_loss {
            tracing::info!("Training complete, final loss {loss:.6}");
            run.final_loss = Some(loss);
            self.state = PollerState::Complete;
            return PollStep::Finished;
        }
        PollStep::Continue
    }

    /// A tick failed; the next tick tries again.
    pub fn tick_failed(&self, err: &ApiError) {
        tracing::warn!("Training status poll failed: {}", err.user_message(Action::Status));
    }

    /// Poll until the run finishes or `cancel` is set, calling `observer` after each tick.
    pub fn drive(
        &mut self,
        backend: &dyn Backend,
        interval: Duration,
        cancel: &AtomicBool,
        mut observer: impl FnMut(&TrainingPoller),
    ) -> PollerState {
        while self.state == PollerState::Polling && !cancel.load(Ordering::SeqCst) {
            let seq = self.begin_tick();
            let step = match backend.status() {
                Ok(status) => self.apply_status(seq, &status.training_state),
                Err(err) => {
                    self.tick_failed(&err);
                    PollStep::Continue
                }
            };
            observer(self);
            if step == PollStep::Finished || !sleep_unless_cancelled(interval, cancel) {
                break;
            }
        }
        self.state
    }
}
