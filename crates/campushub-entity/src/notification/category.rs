//! Notification category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a notification, used for client-side routing.
///
/// The category drives how a client renders and routes a notification,
/// never how it is delivered. Stored in PostgreSQL as the
/// `notification_category` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    /// A direct message from another user.
    DirectMessage,
    /// Attendance updates (marked present/absent, verification results).
    Attendance,
    /// Chat room activity.
    Chat,
    /// Job posting announcements from recruiters.
    JobPosting,
    /// System-level notices.
    System,
    /// Administrative announcements.
    Announcement,
}

impl NotificationCategory {
    /// Return the category as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectMessage => "direct-message",
            Self::Attendance => "attendance",
            Self::Chat => "chat",
            Self::JobPosting => "job-posting",
            Self::System => "system",
            Self::Announcement => "announcement",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = campushub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct-message" => Ok(Self::DirectMessage),
            "attendance" => Ok(Self::Attendance),
            "chat" => Ok(Self::Chat),
            "job-posting" => Ok(Self::JobPosting),
            "system" => Ok(Self::System),
            "announcement" => Ok(Self::Announcement),
            _ => Err(campushub_core::AppError::validation(format!(
                "Invalid notification category: '{s}'"
            ))),
        }
    }
}
