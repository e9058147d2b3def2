#![deny(missing_docs)]
#![deny(warnings)]

//! Entry point for the egui-based fivedash UI.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use std::sync::Arc;

use eframe::egui;
use fivedash::backend::{Backend, HttpBackend};
use fivedash::config::{self, AppSettings};
use fivedash::egui_app::controller::EguiController;
use fivedash::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use fivedash::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let settings_path = match config::config_path() {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::warn!("Settings will not be saved: {err}");
            None
        }
    };
    let mut settings = match &settings_path {
        Some(path) => config::load_from(path).unwrap_or_else(|err| {
            tracing::warn!("Using default settings: {err}");
            AppSettings::default()
        }),
        None => AppSettings::default(),
    };
    config::apply_env_overrides(&mut settings);
    tracing::info!("Backend at {}", settings.backend.base_url);

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&settings.backend));
    let mut controller = EguiController::new(backend, settings);
    if let Some(path) = settings_path {
        controller = controller.with_settings_path(path);
    }

    let viewport = egui::ViewportBuilder::default()
        .with_title("fivedash")
        .with_inner_size([960.0, 720.0])
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_drag_and_drop(true);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "fivedash",
        native_options,
        Box::new(move |_cc| Ok(Box::new(EguiApp::new(controller)))),
    )?;
    Ok(())
}
