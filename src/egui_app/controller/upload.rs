use super::*;
use crate::upload::{self, DatasetSelection, UploadError, UploadOutcome};
use rfd::FileDialog;

impl EguiController {
    pub fn upload_in_progress(&self) -> bool {
        self.jobs.upload_in_progress
    }

    /// Pick a dataset with the native file dialog.
    pub fn choose_dataset_via_dialog(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Pickle dataset", &["pkl"])
            .pick_file()
        else {
            return;
        };
        self.select_dataset_path(path);
    }

    /// Accept a dataset path from the dialog or a drop.
    pub fn select_dataset_path(&mut self, path: PathBuf) {
        match DatasetSelection::from_path(&path) {
            Ok(selection) => {
                tracing::info!("Selected dataset {}", path.display());
                self.ui.upload.selection = Some(selection);
                self.ui.upload.notice = None;
            }
            Err(err) => {
                self.ui.upload.selection = None;
                self.ui.upload.uploaded = false;
                self.ui.upload.notice = Some(StatusNotice::error(err.to_string()));
            }
        }
    }

    /// Drop the picked file without uploading it.
    pub fn clear_selection(&mut self) {
        self.ui.upload.selection = None;
        self.ui.upload.notice = None;
        self.ui.upload.uploaded = false;
    }

    /// The "Next: Train Model" step offered after a successful upload.
    pub fn continue_to_training(&mut self) {
        self.ui.upload.uploaded = false;
        self.navigate(Page::Train);
    }

    /// Handle files dropped on the window; only the first file is used.
    pub fn handle_dropped_paths(&mut self, paths: Vec<PathBuf>) {
        let Some(path) = paths.into_iter().next() else {
            return;
        };
        self.navigate(Page::Upload);
        self.select_dataset_path(path);
    }

    /// Upload the current selection.
    pub fn upload_selected(&mut self) {
        if self.jobs.upload_in_progress {
            return;
        }
        let Some(selection) = self.ui.upload.selection.clone() else {
            self.ui.upload.notice = Some(StatusNotice::error(UploadError::NoSelection.to_string()));
            return;
        };
        let backend = Arc::clone(&self.backend);
        let spawned = self.jobs.spawn_request("upload", move || {
            JobMessage::UploadFinished(upload::upload(backend.as_ref(), Some(&selection)))
        });
        match spawned {
            Ok(()) => {
                self.jobs.upload_in_progress = true;
                self.ui.upload.uploaded = false;
                self.ui.upload.notice = Some(StatusNotice::new("Uploading…", StatusTone::Busy));
            }
            Err(err) => self.ui.upload.notice = Some(StatusNotice::error(err)),
        }
    }

    pub(super) fn finish_upload(&mut self, result: Result<UploadOutcome, UploadError>) {
        self.jobs.upload_in_progress = false;
        match result {
            Ok(outcome) => {
                let message = if outcome.message.is_empty() {
                    "Dataset uploaded".to_string()
                } else {
                    outcome.message
                };
                self.session.record_upload(outcome.info);
                self.ui.upload.notice = Some(StatusNotice::success(message));
                self.ui.upload.uploaded = true;
                self.request_status_refresh();
            }
            Err(err) => {
                tracing::warn!("Upload failed: {err}");
                self.ui.upload.notice = Some(StatusNotice::error(err.to_string()));
            }
        }
    }
}
