/// User-facing notifications
///
/// Every outcome the user should hear about (write succeeded, fetch failed,
/// nothing selected) becomes a `Notification` queued on the controller. The
/// presentation layer drains the queue and shows them as popups.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub text: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Level::Success, title, text)
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Level::Error, title, text)
    }

    fn new(level: Level, title: impl Into<String>, text: impl Into<String>) -> Self {
        Notification {
            level,
            title: title.into(),
            text: text.into(),
        }
    }
}
