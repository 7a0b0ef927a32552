// Notifications for error reporting through the UI collaborator
// Nothing here is fatal: every failure degrades to "no audible effect"

use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// Subsystem a notification originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Storage,
    Playback,
}

/// Notification with timestamp and metadata.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub message: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl Notification {
    pub fn new(level: NotificationLevel, category: NotificationCategory, message: String) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            level,
            category,
            message,
            timestamp,
        }
    }

    pub fn warning(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Warning, category, message)
    }

    pub fn error(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Error, category, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_creation() {
        let notif = Notification::error(NotificationCategory::Storage, "save failed".to_string());

        assert_eq!(notif.level, NotificationLevel::Error);
        assert_eq!(notif.category, NotificationCategory::Storage);
        assert_eq!(notif.message, "save failed");
        assert!(notif.timestamp > 0);
    }

    #[test]
    fn test_notification_helpers() {
        let warning =
            Notification::warning(NotificationCategory::Playback, "skipped".to_string());
        assert_eq!(warning.level, NotificationLevel::Warning);
    }
}
