use crate::backend::UploadResponse;

/// Shape metadata reported by the backend for the uploaded dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetInfo {
    /// Shape of the feature matrix, e.g. `[1000, 5]`.
    pub feature_shape: Vec<u64>,
    /// Shape of the label vector, e.g. `[1000]`.
    pub label_shape: Vec<u64>,
    pub n_samples: Option<u64>,
    pub n_features: Option<u64>,
}

impl DatasetInfo {
    /// Prefer `data_shape`; fall back to `n_samples`/`n_features`.
    pub fn from_upload(response: &UploadResponse) -> Self {
        let (feature_shape, label_shape) = match &response.data_shape {
            Some(shape) => (shape.features.clone(), shape.labels.clone()),
            None => {
                let features = match (response.n_samples, response.n_features) {
                    (Some(samples), Some(features)) => vec![samples, features],
                    _ => Vec::new(),
                };
                let labels = response.n_samples.map(|samples| vec![samples]).unwrap_or_default();
                (features, labels)
            }
        };
        Self {
            n_samples: response.n_samples.or_else(|| feature_shape.first().copied()),
            n_features: response.n_features.or_else(|| feature_shape.get(1).copied()),
            feature_shape,
            label_shape,
        }
    }

    /// Render a shape as `1000 × 5`.
    pub fn format_shape(shape: &[u64]) -> String {
        if shape.is_empty() {
            return "unknown".to_string();
        }
        shape
            .iter()
            .map(|dim| dim.to_string())
            .collect::<Vec<_>>()
            .join(" × ")
    }
}

/// The two readiness flags viewed as one state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    NoDataNoModel,
    DataNoModel,
    DataModel,
    /// Not produced by the backend in practice, but not excluded either.
    NoDataModel,
}

impl Readiness {
    pub fn from_flags(dataset_uploaded: bool, model_trained: bool) -> Self {
        match (dataset_uploaded, model_trained) {
            (false, false) => Self::NoDataNoModel,
            (true, false) => Self::DataNoModel,
            (true, true) => Self::DataModel,
            (false, true) => Self::NoDataModel,
        }
    }

    pub fn has_dataset(self) -> bool {
        matches!(self, Self::DataNoModel | Self::DataModel)
    }

    pub fn has_model(self) -> bool {
        matches!(self, Self::DataModel | Self::NoDataModel)
    }
}

/// Client-held summary of backend-confirmed dataset and model readiness.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub dataset_uploaded: bool,
    pub model_trained: bool,
    pub dataset_info: Option<DatasetInfo>,
    /// True until the first status refresh completes, successfully or not.
    pub loading: bool,
    pub model_name: Option<String>,
    /// Message from the most recent failed refresh; cleared by the next success.
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            dataset_uploaded: false,
            model_trained: false,
            dataset_info: None,
            loading: true,
            model_name: None,
            last_error: None,
        }
    }
}

impl SessionState {
    pub fn readiness(&self) -> Readiness {
        Readiness::from_flags(self.dataset_uploaded, self.model_trained)
    }

    /// Whether screens may treat the flags as current.
    pub fn is_ready(&self) -> bool {
        !self.loading
    }

    /// Back to the empty defaults, keeping `loading` as it is.
    pub(crate) fn clear(&mut self) {
        *self = Self {
            loading: self.loading,
            ..Self::default()
        };
    }
}
