//! Notifications
//!
//! One-way, fire-and-forget messages for the cashier.

use std::sync::{Mutex, PoisonError};

use mockall::automock;
use tracing::{error, info, warn};

/// How a notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation completed
    Success,

    /// Input needs attention
    Warning,

    /// Operation failed
    Error,
}

/// A message for the cashier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation level
    pub severity: Severity,

    /// Message text
    pub message: String,
}

impl Notification {
    /// Success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Warning notification
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Presentation hook for notifications.
#[automock]
pub trait NotificationSink: Send + Sync {
    /// Show a notification. Never fails and never blocks.
    fn notify(&self, notification: Notification);
}

/// Sink that emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => info!("{}", notification.message),
            Severity::Warning => warn!("{}", notification.message),
            Severity::Error => error!("{}", notification.message),
        }
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_notifications_in_order() {
        let log = NotificationLog::new();

        log.notify(Notification::warning("first"));
        log.notify(Notification::success("second"));

        assert_eq!(
            log.entries(),
            vec![
                Notification::warning("first"),
                Notification::success("second")
            ]
        );
    }

    #[test]
    fn constructors_set_severity() {
        assert_eq!(Notification::error("x").severity, Severity::Error);
        assert_eq!(Notification::warning("x").severity, Severity::Warning);
        assert_eq!(Notification::success("x").severity, Severity::Success);
    }
}
