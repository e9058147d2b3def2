//! UI state for the four pages and the shared banner.

mod status;

pub use status::{StatusNotice, StatusTone};

use crate::prediction::{FeatureForm, Prediction};
use crate::training::TrainingForm;
use crate::upload::DatasetSelection;

/// Top-level pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    Upload,
    Train,
    Predict,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Upload, Page::Train, Page::Predict];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Upload => "Upload Dataset",
            Page::Train => "Train Model",
            Page::Predict => "Make Prediction",
        }
    }
}

/// Backend health as last reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HomeState {
    /// `None` until the first health check answers.
    pub health: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadState {
    pub selection: Option<DatasetSelection>,
    pub notice: Option<StatusNotice>,
    /// The last upload succeeded and nothing was picked since.
    pub uploaded: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingPageState {
    pub form: TrainingForm,
    pub notice: Option<StatusNotice>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictState {
    pub form: FeatureForm,
    pub result: Option<Prediction>,
    pub notice: Option<StatusNotice>,
}

/// Everything the renderer reads, owned by the controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub page: Page,
    pub home: HomeState,
    pub upload: UploadState,
    pub training: TrainingPageState,
    pub predict: PredictState,
    /// Outcome of the last app-wide action (clear all, delete model).
    pub banner: Option<StatusNotice>,
    /// The "Clear All" confirmation window is open.
    pub confirm_clear: bool,
}
