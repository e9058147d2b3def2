use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, RichText};

use crate::egui_app::controller::{CHECKING_STATUS, EguiController};
use crate::egui_app::state::{Page, StatusNotice};

mod home;
mod loss_chart;
mod predict_page;
mod status_banner;
pub mod style;
mod train_page;
mod upload_page;

/// Smallest window that fits the training form and chart.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(760.0, 560.0);
const IDLE_REPAINT: Duration = Duration::from_millis(500);
const BUSY_REPAINT: Duration = Duration::from_millis(100);

/// eframe application wrapper around [`EguiController`].
pub struct EguiApp {
    controller: EguiController,
    visuals_set: bool,
}

impl EguiApp {
    /// Wrap `controller` and start its background polling.
    pub fn new(mut controller: EguiController) -> Self {
        controller.start_background_polling();
        Self {
            controller,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let paths: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if !paths.is_empty() {
            self.controller.handle_dropped_paths(paths);
        }
    }

    fn render_nav(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.horizontal(|ui| {
            ui.label(RichText::new("fivedash").strong().color(palette.accent));
            ui.separator();
            for page in Page::ALL {
                let selected = self.controller.ui.page == page;
                if ui.selectable_label(selected, page.label()).clicked() {
                    self.controller.navigate(page);
                }
            }
        });
    }

    fn render_page(&mut self, ui: &mut egui::Ui) {
        match self.controller.ui.page {
            Page::Home => self.render_home(ui),
            Page::Upload => self.render_upload_page(ui),
            Page::Train => self.render_train_page(ui),
            Page::Predict => self.render_predict_page(ui),
        }
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.poll_jobs();
        self.handle_dropped_files(ctx);
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| self.render_nav(ui));
        egui::TopBottomPanel::top("status_banner").show(ctx, |ui| self.render_status_banner(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.render_page(ui));
        });
        self.render_clear_confirm(ctx);
        let repaint = if self.controller.has_pending_work() {
            BUSY_REPAINT
        } else {
            IDLE_REPAINT
        };
        ctx.request_repaint_after(repaint);
    }
}

/// Draw an optional notice in its tone color.
fn notice_label(ui: &mut egui::Ui, notice: Option<&StatusNotice>) {
    if let Some(notice) = notice {
        ui.label(RichText::new(&notice.text).color(style::tone_color(notice.tone)));
    }
}

/// Placeholder for pages that wait on the first status refresh.
fn checking_status(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(RichText::new(CHECKING_STATUS).color(style::palette().text_muted));
    });
}

/// Shown on pages that need something the session does not have yet.
fn prerequisite_hint(ui: &mut egui::Ui, controller: &mut EguiController, text: &str, page: Page) {
    ui.label(RichText::new(text).color(style::palette().warning));
    if ui.button(format!("Go to {}", page.label())).clicked() {
        controller.navigate(page);
    }
}
