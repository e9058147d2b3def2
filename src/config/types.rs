use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::training::{HyperparameterBounds, TrainingForm};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATUS_INTERVAL_MS: u64 = 5_000;
const DEFAULT_TRAINING_INTERVAL_MS: u64 = 1_000;
const MIN_STATUS_INTERVAL_MS: u64 = 1_000;
const MIN_TRAINING_INTERVAL_MS: u64 = 500;
const MAX_TRAINING_INTERVAL_MS: u64 = 3_000;

/// Persisted settings stored in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Where the backend lives and how long to wait for it.
    pub backend: BackendSettings,
    /// Poll cadences.
    pub polling: PollingSettings,
    /// Hyperparameter bounds and the last used training form.
    pub training: TrainingSettings,
    /// Prediction display options.
    pub prediction: PredictionSettings,
}

impl AppSettings {
    /// Clamp out-of-range values and replace unusable ones with defaults.
    pub fn normalized(mut self) -> Self {
        self.backend = self.backend.normalized();
        self.polling = self.polling.normalized();
        self.training = self.training.normalized();
        self
    }
}

/// Config keys: `base_url`, `connect_timeout_secs`, `request_timeout_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BackendSettings {
    fn normalized(mut self) -> Self {
        match parse_base_url(&self.base_url) {
            Some(url) => self.base_url = url.as_str().trim_end_matches('/').to_string(),
            None => {
                tracing::warn!(
                    "Ignoring invalid backend URL {:?}; using {DEFAULT_BASE_URL}",
                    self.base_url
                );
                self.base_url = DEFAULT_BASE_URL.to_string();
            }
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = DEFAULT_CONNECT_TIMEOUT_SECS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        self
    }

    /// Replace the base URL when `candidate` is a usable http(s) URL.
    pub fn override_base_url(&mut self, candidate: &str) -> bool {
        match parse_base_url(candidate) {
            Some(url) => {
                self.base_url = url.as_str().trim_end_matches('/').to_string();
                true
            }
            None => false,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_base_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(url)
}

/// Config keys: `status_interval_ms`, `training_interval_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Session status refresh cadence.
    pub status_interval_ms: u64,
    /// Training progress cadence, kept within 0.5–3 seconds.
    pub training_interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            training_interval_ms: DEFAULT_TRAINING_INTERVAL_MS,
        }
    }
}

impl PollingSettings {
    fn normalized(mut self) -> Self {
        self.status_interval_ms = self.status_interval_ms.max(MIN_STATUS_INTERVAL_MS);
        self.training_interval_ms = self
            .training_interval_ms
            .clamp(MIN_TRAINING_INTERVAL_MS, MAX_TRAINING_INTERVAL_MS);
        self
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn training_interval(&self) -> Duration {
        Duration::from_millis(self.training_interval_ms)
    }
}

/// Learning-rate bounds plus the raw text of the last submitted training form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub learning_rate_min: f64,
    pub learning_rate_max: f64,
    pub epochs: String,
    pub batch_size: String,
    pub learning_rate: String,
    pub hidden_layers: String,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        let bounds = HyperparameterBounds::default();
        let form = TrainingForm::default();
        Self {
            learning_rate_min: bounds.learning_rate_min,
            learning_rate_max: bounds.learning_rate_max,
            epochs: form.epochs,
            batch_size: form.batch_size,
            learning_rate: form.learning_rate,
            hidden_layers: form.hidden_layers,
        }
    }
}

impl TrainingSettings {
    fn normalized(mut self) -> Self {
        let min = self.learning_rate_min;
        let max = self.learning_rate_max;
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            let defaults = HyperparameterBounds::default();
            self.learning_rate_min = defaults.learning_rate_min;
            self.learning_rate_max = defaults.learning_rate_max;
        }
        self
    }

    pub fn bounds(&self) -> HyperparameterBounds {
        HyperparameterBounds {
            learning_rate_min: self.learning_rate_min,
            learning_rate_max: self.learning_rate_max,
            ..HyperparameterBounds::default()
        }
    }

    pub fn form(&self) -> TrainingForm {
        TrainingForm {
            epochs: self.epochs.clone(),
            batch_size: self.batch_size.clone(),
            learning_rate: self.learning_rate.clone(),
            hidden_layers: self.hidden_layers.clone(),
        }
    }

    /// Remember the form text so the next launch starts from it.
    pub fn remember_form(&mut self, form: &TrainingForm) {
        self.epochs = form.epochs.clone();
        self.batch_size = form.batch_size.clone();
        self.learning_rate = form.learning_rate.clone();
        self.hidden_layers = form.hidden_layers.clone();
    }
}

/// Config keys: `assume_full_confidence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// Show a confidence of 1.0 when the backend does not report one.
    pub assume_full_confidence: bool,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            assume_full_confidence: true,
        }
    }
}

impl PredictionSettings {
    pub fn default_confidence(&self) -> Option<f64> {
        self.assume_full_confidence.then_some(1.0)
    }
}
