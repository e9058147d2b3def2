//! Desktop front end: controller, UI state, and egui rendering.

/// Bridges the session, poller, and backend jobs to the UI.
pub mod controller;
/// Plain data rendered by the UI.
pub mod state;
/// egui rendering.
pub mod ui;
