use super::*;

impl EguiApp {
    pub(super) fn render_predict_page(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.heading("Make Prediction");
        let session = self.controller.session();
        if !session.is_ready() {
            checking_status(ui);
            return;
        }
        if !session.model_trained {
            prerequisite_hint(
                ui,
                &mut self.controller,
                "Train a model before making predictions.",
                Page::Train,
            );
            return;
        }

        let submitting = self.controller.predict_in_progress();
        let fields = &mut self.controller.ui.predict.form.0;
        egui::Grid::new("feature_inputs")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (index, field) in fields.iter_mut().enumerate() {
                    ui.label(format!("Feature {}", index + 1));
                    ui.add_enabled(
                        !submitting,
                        egui::TextEdit::singleline(field).desired_width(160.0),
                    );
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!submitting, egui::Button::new("Predict"))
                .clicked()
            {
                self.controller.submit_prediction();
            }
            if ui
                .add_enabled(!submitting, egui::Button::new("Randomize"))
                .clicked()
            {
                self.controller.randomize_features();
            }
            if ui
                .add_enabled(!submitting, egui::Button::new("Reset"))
                .clicked()
            {
                self.controller.reset_prediction();
            }
            if submitting {
                ui.spinner();
            }
        });
        notice_label(ui, self.controller.ui.predict.notice.as_ref());

        if let Some(result) = self.controller.ui.predict.result {
            ui.add_space(12.0);
            ui.label(
                RichText::new(format!("Prediction: {:.4}", result.prediction))
                    .size(20.0)
                    .color(palette.accent),
            );
            let confidence = match self.controller.displayed_confidence() {
                Some(confidence) => format!("Confidence: {:.1}%", confidence * 100.0),
                None => "Confidence: unavailable".to_string(),
            };
            ui.label(RichText::new(confidence).color(palette.text_muted));
        }
    }
}
