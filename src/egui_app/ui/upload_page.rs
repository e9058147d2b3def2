use super::*;
use crate::session::DatasetInfo;

impl EguiApp {
    pub(super) fn render_upload_page(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.heading("Upload Dataset");
        ui.label(
            RichText::new("Pickle file with feature matrix X (n × 5) and target vector y.")
                .color(palette.text_muted),
        );
        ui.add_space(8.0);

        let uploading = self.controller.upload_in_progress();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!uploading, egui::Button::new("Choose file…"))
                .clicked()
            {
                self.controller.choose_dataset_via_dialog();
            }
            ui.label(RichText::new("or drop a .pkl file onto the window").color(palette.text_muted));
        });

        let mut remove = false;
        if let Some(selection) = &self.controller.ui.upload.selection {
            egui::Grid::new("dataset_selection")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("File");
                    ui.horizontal(|ui| {
                        ui.monospace(selection.file_name());
                        remove = ui
                            .add_enabled(!uploading, egui::Button::new("Remove"))
                            .clicked();
                    });
                    ui.end_row();
                    ui.label("Size");
                    ui.label(selection.size_label());
                    ui.end_row();
                });
        }
        if remove {
            self.controller.clear_selection();
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!uploading, egui::Button::new("Upload"))
                .clicked()
            {
                self.controller.upload_selected();
            }
            if uploading {
                ui.spinner();
            }
        });
        notice_label(ui, self.controller.ui.upload.notice.as_ref());
        if self.controller.ui.upload.uploaded
            && ui.button(format!("Next: {}", Page::Train.label())).clicked()
        {
            self.controller.continue_to_training();
        }

        let session = self.controller.session();
        if let (true, Some(info)) = (session.dataset_uploaded, &session.dataset_info) {
            ui.add_space(12.0);
            ui.label(RichText::new("Current dataset").strong());
            egui::Grid::new("dataset_info").num_columns(2).show(ui, |ui| {
                ui.label("Features (X)");
                ui.label(DatasetInfo::format_shape(&info.feature_shape));
                ui.end_row();
                ui.label("Labels (y)");
                ui.label(DatasetInfo::format_shape(&info.label_shape));
                ui.end_row();
            });
        }
    }
}
