//! User-facing side effects: transient notifications and navigation.
//!
//! The client never renders anything itself. Whatever front end embeds it
//! implements [`Notifier`]; the console binary logs through `tracing`.

use std::time::Duration;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub title: Option<String>,
    pub message: String,
    /// `None` keeps the notification until the user dismisses it.
    pub duration: Option<Duration>,
    /// Route to open when the notification is clicked.
    pub link: Option<String>,
}

/// Default auto-dismiss for transient messages.
pub const MESSAGE_DURATION: Duration = Duration::from_millis(3000);

impl Notification {
    /// A transient error toast.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: None,
            message: message.into(),
            duration: Some(MESSAGE_DURATION),
            link: None,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
    fn navigate(&self, path: &str);
}

/// Notifier that writes everything to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        let title = n.title.as_deref().unwrap_or("");
        match n.level {
            Level::Error => tracing::error!(%title, message = %n.message, "notification"),
            Level::Warning => tracing::warn!(%title, message = %n.message, "notification"),
            Level::Success | Level::Info => {
                tracing::info!(%title, message = %n.message, link = ?n.link, "notification")
            }
        }
    }

    fn navigate(&self, path: &str) {
        tracing::info!(%path, "navigate");
    }
}

/// Notifier that keeps everything it is handed, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
    navigations: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().push(path.to_string());
    }
}
