//! Training form validation and the training run poller.

mod poller;
mod validate;

pub use poller::{PollStep, PollerState, TrainingPoller, TrainingRun, TrainingStartError};
pub use validate::{
    HyperparameterBounds, Hyperparameters, TrainingForm, TrainingInputError, parse_hidden_layers,
    validate,
};
