//! Durable notification store abstraction.

use async_trait::async_trait;

use campushub_core::result::AppResult;
use campushub_core::types::id::{NotificationId, UserId};
use campushub_core::types::pagination::{PageRequest, PageResponse};
use campushub_entity::notification::{Notification, NotificationContent};

/// Durable CRUD over notification records.
///
/// The production implementation is [`crate::repositories::NotificationRepository`];
/// tests substitute an in-memory store. Records are append-mostly: the
/// only permitted mutation is the idempotent, set-once `read_at` update.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist one notification for `recipient`, assigning its id and
    /// creation time. Creation is atomic per record — a failure never
    /// leaves a partial row behind.
    async fn create(
        &self,
        recipient: UserId,
        content: &NotificationContent,
    ) -> AppResult<Notification>;

    /// Set `read_at` to the current time if it is absent and the record
    /// belongs to `recipient`.
    ///
    /// Fails with `NotFound` when no such record exists for that
    /// recipient; an already-read record is a no-op, so repeated
    /// acknowledgments leave `read_at` at its first value.
    async fn mark_read(&self, notification_id: NotificationId, recipient: UserId)
        -> AppResult<()>;

    /// List `recipient`'s notifications ordered by creation time
    /// descending, bounded by the pagination window.
    async fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count `recipient`'s unread notifications.
    async fn count_unread(&self, recipient: UserId) -> AppResult<i64>;
}
