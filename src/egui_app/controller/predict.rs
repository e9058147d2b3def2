use super::*;
use crate::backend::{Action, ApiError};
use crate::prediction::{self, FeatureForm, Prediction};

impl EguiController {
    pub fn predict_in_progress(&self) -> bool {
        self.jobs.predict_in_progress
    }

    /// Validate the five inputs and send `POST /predict`.
    pub fn submit_prediction(&mut self) {
        if self.jobs.predict_in_progress {
            return;
        }
        if !self.session.state().is_ready() {
            self.ui.predict.notice = Some(StatusNotice::new(CHECKING_STATUS, StatusTone::Busy));
            return;
        }
        let vector = match self.ui.predict.form.parse() {
            Ok(vector) => vector,
            Err(err) => {
                self.ui.predict.result = None;
                self.ui.predict.notice = Some(StatusNotice::error(err.to_string()));
                return;
            }
        };
        let backend = Arc::clone(&self.backend);
        let spawned = self.jobs.spawn_request("predict", move || {
            JobMessage::PredictionFinished(prediction::submit(backend.as_ref(), vector))
        });
        match spawned {
            Ok(()) => {
                self.jobs.predict_in_progress = true;
                self.ui.predict.result = None;
                self.ui.predict.notice = None;
            }
            Err(err) => self.ui.predict.notice = Some(StatusNotice::error(err)),
        }
    }

    /// Fill the five inputs with sample values.
    pub fn randomize_features(&mut self) {
        self.ui.predict.form = FeatureForm::random(&mut rand::rng());
        self.ui.predict.result = None;
        self.ui.predict.notice = None;
    }

    /// Empty the inputs and forget the last result.
    pub fn reset_prediction(&mut self) {
        self.ui.predict = PredictState::default();
    }

    pub(super) fn finish_prediction(&mut self, result: Result<Prediction, ApiError>) {
        self.jobs.predict_in_progress = false;
        match result {
            Ok(prediction) => {
                self.ui.predict.result = Some(prediction);
                self.ui.predict.notice = None;
            }
            Err(err) => {
                self.ui.predict.notice =
                    Some(StatusNotice::error(err.user_message(Action::Predict)));
            }
        }
    }

    /// Confidence to display for the last prediction.
    pub fn displayed_confidence(&self) -> Option<f64> {
        let prediction = self.ui.predict.result?;
        prediction.confidence_or(self.settings.prediction.default_confidence())
    }
}
