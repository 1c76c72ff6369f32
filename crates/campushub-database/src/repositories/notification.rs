//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use campushub_core::error::{AppError, ErrorKind};
use campushub_core::result::AppResult;
use campushub_core::types::id::{NotificationId, UserId};
use campushub_core::types::pagination::{PageRequest, PageResponse};
use campushub_entity::notification::{Notification, NotificationContent};

use crate::store::NotificationStore;

/// PostgreSQL-backed implementation of [`NotificationStore`].
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(
        &self,
        recipient: UserId,
        content: &NotificationContent,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, category, title, body, payload) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(recipient)
        .bind(content.category)
        .bind(&content.title)
        .bind(&content.body)
        .bind(content.payload.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient: UserId,
    ) -> AppResult<()> {
        // The read_at IS NULL guard makes the read-then-write atomic per
        // record; concurrent acknowledgments race to a single winner.
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM notifications WHERE id = $1 AND user_id = $2)",
            )
            .bind(notification_id)
            .bind(recipient)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to look up notification", e)
            })?;

            if !exists {
                return Err(AppError::not_found(format!(
                    "No notification {notification_id} for this recipient"
                )));
            }
            // Already read — idempotent no-op.
        }

        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(recipient)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
                })?;

        let notifs = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(recipient)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::new(
            notifs,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_unread(&self, recipient: UserId) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }
}
