//! Desktop and command-line front end for a remote neural-network training backend.
/// Per-user directories for settings and logs.
pub mod app_dirs;
/// Tracing setup for the desktop app and the CLI.
pub mod logging;
/// Persistent settings.
pub mod config;
pub(crate) mod http_client;
/// Typed client for the backend HTTP API.
pub mod backend;
/// Cancellable periodic tasks and request sequencing.
pub mod schedule;
/// Dataset and model readiness as reported by the backend.
pub mod session;
/// Hyperparameter validation and training progress tracking.
pub mod training;
/// Feature input parsing and prediction requests.
pub mod prediction;
/// Dataset selection and upload.
pub mod upload;
/// Shared egui UI modules.
pub mod egui_app;
