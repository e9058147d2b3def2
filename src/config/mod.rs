//! Persisted settings: backend location, poll cadences, training defaults.

mod errors;
mod io;
mod types;

pub use errors::ConfigError;
pub use io::{
    BACKEND_URL_ENV, CONFIG_FILE_NAME, apply_env_overrides, config_path, load_from,
    load_or_default, save, save_to_path,
};
pub use types::{
    AppSettings, BackendSettings, DEFAULT_BASE_URL, PollingSettings, PredictionSettings,
    TrainingSettings,
};
