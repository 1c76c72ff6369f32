//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campushub_core::AppResult;
use campushub_core::error::AppError;
use campushub_core::types::id::{NotificationId, UserId};

use super::category::NotificationCategory;

/// A notification addressed to a single recipient.
///
/// Created exactly once per (event, recipient) pair and never mutated
/// afterwards except to set `read_at`. A broadcast produces one
/// independent record per resolved recipient.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier, assigned at creation.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Notification category (client-side routing only).
    pub category: NotificationCategory,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Additional structured data associated with the category.
    pub payload: Option<serde_json::Value>,
    /// When the recipient acknowledged the notification. Set at most once.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the recipient has not yet acknowledged this notification.
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

/// Caller-supplied content of a notification.
///
/// The store stamps recipient, id, and creation time; this struct carries
/// everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Notification category.
    pub category: NotificationCategory,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Additional structured data.
    pub payload: Option<serde_json::Value>,
}

impl NotificationContent {
    /// Create notification content without a payload.
    pub fn new(
        category: NotificationCategory,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            body: body.into(),
            payload: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Validate that required text fields are non-empty.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("Notification title must not be empty"));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::validation("Notification body must not be empty"));
        }
        Ok(())
    }
}
