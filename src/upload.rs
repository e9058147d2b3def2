//! Dataset file selection and upload.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{Action, ApiError, Backend, DatasetFile};
use crate::session::DatasetInfo;

/// Required dataset file extension, compared case-sensitively.
pub const DATASET_EXTENSION: &str = ".pkl";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Please select a file first.")]
    NoSelection,
    #[error("Please select a .pkl file")]
    WrongExtension,
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", .0.user_message(Action::Upload))]
    Api(#[from] ApiError),
}

/// A dataset file the user picked, not yet read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetSelection {
    path: PathBuf,
    file_name: String,
    size_bytes: u64,
}

impl DatasetSelection {
    /// Accept `path` if its name ends in `.pkl` and the file exists.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| name.ends_with(DATASET_EXTENSION))
            .ok_or(UploadError::WrongExtension)?
            .to_string();
        let metadata = fs::metadata(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size_bytes: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size for display, e.g. `12.50 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }

    pub fn read(&self) -> Result<DatasetFile, UploadError> {
        let bytes = fs::read(&self.path).map_err(|source| UploadError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(DatasetFile {
            file_name: self.file_name.clone(),
            bytes,
        })
    }
}

/// What a successful upload reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub message: String,
    pub info: DatasetInfo,
}

/// Read the selected file and `POST /upload` it.
///
/// The caller records the outcome on the session and refreshes status.
pub fn upload(
    backend: &dyn Backend,
    selection: Option<&DatasetSelection>,
) -> Result<UploadOutcome, UploadError> {
    let selection = selection.ok_or(UploadError::NoSelection)?;
    let dataset = selection.read()?;
    tracing::info!(
        "Uploading {} ({})",
        selection.file_name(),
        selection.size_label()
    );
    let response = backend.upload(&dataset)?;
    let info = DatasetInfo::from_upload(&response);
    tracing::info!(
        "Upload accepted: features {}, labels {}",
        DatasetInfo::format_shape(&info.feature_shape),
        DatasetInfo::format_shape(&info.label_shape)
    );
    Ok(UploadOutcome {
        message: response.message,
        info,
    })
}
