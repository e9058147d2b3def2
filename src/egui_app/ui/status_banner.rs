use super::*;
use crate::session::DatasetInfo;
use eframe::egui::Align2;

impl EguiApp {
    pub(super) fn render_status_banner(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let session = self.controller.session().clone();
        if session.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Checking backend…").color(palette.text_muted));
            });
            return;
        }
        ui.horizontal(|ui| {
            let dataset = match (&session.dataset_info, session.dataset_uploaded) {
                (Some(info), true) => format!(
                    "Dataset: loaded ({})",
                    DatasetInfo::format_shape(&info.feature_shape)
                ),
                (None, true) => "Dataset: loaded".to_string(),
                (_, false) => "Dataset: none".to_string(),
            };
            ui.label(RichText::new(dataset).color(readiness_color(session.dataset_uploaded)));
            ui.separator();
            let model = match (&session.model_name, session.model_trained) {
                (Some(name), true) => format!("Model: trained ({name})"),
                (None, true) => "Model: trained".to_string(),
                (_, false) => "Model: not trained".to_string(),
            };
            ui.label(RichText::new(model).color(readiness_color(session.model_trained)));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.controller.has_data_to_clear() {
                    let clearing = self.controller.clear_all_in_progress();
                    if ui
                        .add_enabled(!clearing, egui::Button::new("Clear All"))
                        .clicked()
                    {
                        self.controller.ask_clear_all();
                    }
                }
                let can_delete =
                    session.model_trained && !self.controller.delete_model_in_progress();
                if ui
                    .add_enabled(can_delete, egui::Button::new("Delete Model"))
                    .clicked()
                {
                    self.controller.delete_model();
                }
            });
        });
        if let Some(error) = &session.last_error {
            ui.label(RichText::new(error).color(palette.warning));
        }
        notice_label(ui, self.controller.ui.banner.as_ref());
    }

    pub(super) fn render_clear_confirm(&mut self, ctx: &egui::Context) {
        if !self.controller.ui.confirm_clear {
            return;
        }
        let mut open = true;
        let mut confirm = false;
        let mut cancel = false;
        egui::Window::new("Clear all data?")
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("This removes the uploaded dataset and the trained model from the backend.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let clear = RichText::new("Clear All").color(style::palette().danger);
                    if ui.button(clear).clicked() {
                        confirm = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if confirm {
            self.controller.clear_all();
        } else if cancel || !open {
            self.controller.cancel_clear_all();
        }
    }
}

fn readiness_color(ready: bool) -> egui::Color32 {
    let palette = style::palette();
    if ready {
        palette.success
    } else {
        palette.text_muted
    }
}
