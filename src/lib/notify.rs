use log::{error, info, warn};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    /// Background class of the toast that renders this level.
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Success => "bg-success",
            Level::Error => "bg-danger",
            Level::Warning => "bg-warning",
            Level::Info => "bg-info",
        }
    }
}

/// A trait for every surface that can show notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: Level);
}

/// Writes notices to the log instead of a toast container.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, level: Level) {
        match level {
            Level::Error => error!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Success | Level::Info => info!("{}", message),
        }
    }
}
