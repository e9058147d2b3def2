/// User-triggered operations, used to phrase error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Health,
    Status,
    Upload,
    Train,
    Predict,
    Reset,
    DeleteModel,
}

impl Action {
    /// Prefix for transport failures, e.g. "Error during upload".
    pub fn transport_prefix(self) -> &'static str {
        match self {
            Self::Health => "Error checking backend health",
            Self::Status => "Error fetching app status",
            Self::Upload => "Error during upload",
            Self::Train => "Error starting training",
            Self::Predict => "Error making prediction",
            Self::Reset => "Error clearing state",
            Self::DeleteModel => "Error deleting model",
        }
    }

    /// Message used when the backend rejects a request without a `detail`.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Health => "Health check failed",
            Self::Status => "Status check failed",
            Self::Upload => "Upload failed",
            Self::Train => "Training failed to start",
            Self::Predict => "Prediction failed",
            Self::Reset => "Reset failed",
            Self::DeleteModel => "Model deletion failed",
        }
    }
}

/// Failures talking to the backend.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, or timeout failure; the request may not have arrived.
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Backend { status: u16, detail: Option<String> },
    /// A 2xx response whose body could not be read or parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The request could not be prepared locally (e.g. the file could not be read).
    #[error("{0}")]
    Local(String),
}

impl ApiError {
    /// Text shown to the user when `action` fails with this error.
    pub fn user_message(&self, action: Action) -> String {
        match self {
            Self::Backend {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Backend { detail: None, .. } => action.fallback_message().to_string(),
            Self::Transport(message) | Self::InvalidResponse(message) | Self::Local(message) => {
                format!("{}: {message}", action.transport_prefix())
            }
        }
    }
}

/// Pull `detail` out of an error body, stringifying structured values.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) if text.trim().is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        structured => Some(structured.to_string()),
    }
}
