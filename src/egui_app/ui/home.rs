use super::*;

impl EguiApp {
    pub(super) fn render_home(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.heading("5D Regression Dashboard");
        ui.label(
            RichText::new("Upload a dataset, train a neural network, and make predictions.")
                .color(palette.text_muted),
        );
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            ui.label("Backend:");
            ui.monospace(self.controller.settings().backend.base_url.as_str());
        });
        ui.horizontal(|ui| {
            ui.label("Health:");
            match self.controller.ui.home.health.as_deref() {
                Some(status) => {
                    ui.label(RichText::new(status).color(style::health_color(status)));
                }
                None => {
                    ui.spinner();
                }
            }
        });
        if ui.link("Open API documentation").clicked() {
            let url = self.controller.api_docs_url();
            if let Err(err) = open::that(&url) {
                tracing::warn!("Could not open {url}: {err}");
                self.controller.ui.banner =
                    Some(StatusNotice::warning(format!("Could not open {url}: {err}")));
            }
        }

        ui.add_space(16.0);
        ui.label(RichText::new("Getting started").strong());
        let readiness = self.controller.readiness();
        let steps = [
            (Page::Upload, "Upload a .pkl dataset", readiness.has_dataset()),
            (Page::Train, "Train the model", readiness.has_model()),
            (Page::Predict, "Predict from five features", false),
        ];
        for (index, (page, text, done)) in steps.into_iter().enumerate() {
            ui.horizontal(|ui| {
                let marker = if done { "✔" } else { "•" };
                let color = if done { palette.success } else { palette.text };
                ui.label(RichText::new(format!("{marker} {}. {text}", index + 1)).color(color));
                if ui.small_button(page.label()).clicked() {
                    self.controller.navigate(page);
                }
            });
        }
    }
}
