/// Visual weight of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Busy,
    Success,
    Warning,
    Error,
}

/// One line of feedback shown on a page or in the banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusNotice {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusNotice {
    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, StatusTone::Info)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, StatusTone::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, StatusTone::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, StatusTone::Error)
    }
}
