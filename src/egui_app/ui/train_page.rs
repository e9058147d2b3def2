use super::*;
use crate::training::PollerState;

impl EguiApp {
    pub(super) fn render_train_page(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.heading("Train Model");
        let session = self.controller.session();
        if !session.is_ready() {
            checking_status(ui);
            return;
        }
        if !session.dataset_uploaded {
            prerequisite_hint(
                ui,
                &mut self.controller,
                "Upload a dataset before training.",
                Page::Upload,
            );
            return;
        }

        let active = self.controller.poller().state().is_active();
        let bounds = self.controller.settings().training.bounds();
        let form = &mut self.controller.ui.training.form;
        egui::Grid::new("training_form")
            .num_columns(3)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                form_row(
                    ui,
                    active,
                    "Epochs",
                    &mut form.epochs,
                    format!("{}–{}", bounds.epochs_min, bounds.epochs_max),
                );
                form_row(
                    ui,
                    active,
                    "Batch size",
                    &mut form.batch_size,
                    format!("{}–{}", bounds.batch_size_min, bounds.batch_size_max),
                );
                form_row(
                    ui,
                    active,
                    "Learning rate",
                    &mut form.learning_rate,
                    format!("{}–{}", bounds.learning_rate_min, bounds.learning_rate_max),
                );
                form_row(
                    ui,
                    active,
                    "Hidden layers",
                    &mut form.hidden_layers,
                    "comma-separated, e.g. 64,32,16".to_string(),
                );
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!active, egui::Button::new("Start Training"))
                .clicked()
            {
                self.controller.start_training();
            }
            if active {
                ui.spinner();
            }
        });
        notice_label(ui, self.controller.ui.training.notice.as_ref());

        let state = self.controller.poller().state();
        let Some(run) = self.controller.poller().run() else {
            return;
        };
        if run.job_id.is_none() && state == PollerState::Failed {
            return;
        }
        ui.add_space(12.0);
        let label = format!("Epoch {}/{}", run.current_epoch, run.total_epochs);
        ui.add(egui::ProgressBar::new(run.progress()).text(label));
        if let Some(loss) = run.latest_loss() {
            let caption = if run.final_loss.is_some() {
                "Final loss"
            } else {
                "Current loss"
            };
            ui.label(RichText::new(format!("{caption}: {loss:.6}")).color(palette.text));
        }
        ui.add_space(6.0);
        loss_chart::render(ui, &run.loss_history, run.total_epochs);
        if state == PollerState::Complete {
            ui.add_space(6.0);
            let go = ui.button(format!("Go to {}", Page::Predict.label()));
            if go.clicked() {
                self.controller.navigate(Page::Predict);
            }
        }
    }
}

fn form_row(ui: &mut egui::Ui, locked: bool, label: &str, value: &mut String, hint: String) {
    ui.label(label);
    ui.add_enabled(
        !locked,
        egui::TextEdit::singleline(value).desired_width(160.0),
    );
    ui.label(RichText::new(hint).color(style::palette().text_muted));
    ui.end_row();
}
