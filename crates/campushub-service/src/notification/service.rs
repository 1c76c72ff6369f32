//! Notification orchestration — persists one record per resolved
//! recipient, then dispatches each persisted record.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use campushub_core::config::notifications::NotificationsConfig;
use campushub_core::error::AppError;
use campushub_core::result::AppResult;
use campushub_core::types::id::{NotificationId, UserId};
use campushub_core::types::pagination::{PageRequest, PageResponse};
use campushub_database::NotificationStore;
use campushub_entity::notification::{Notification, NotificationContent, NotificationTarget};

use super::dispatcher::{DeliveryDispatcher, DeliveryOutcome};
use super::resolver::TargetResolver;

/// A persisted notification together with its dispatch outcome.
///
/// Persistence succeeding is the operation's success condition; the
/// dispatch outcome rides along as metadata.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// The durably stored notification.
    pub notification: Notification,
    /// What happened when pushing it to live sessions.
    pub delivery: DeliveryOutcome,
}

/// Per-recipient result of a batch send.
#[derive(Debug)]
pub struct RecipientOutcome {
    /// The recipient this result belongs to.
    pub recipient: UserId,
    /// The receipt, or the error that stopped this recipient's unit of
    /// work. One recipient's failure never affects the others.
    pub result: Result<SendReceipt, AppError>,
}

/// Orchestrates notification fan-out: every send persists one record per
/// recipient before any real-time push is attempted.
///
/// Within one recipient's unit of work persistence strictly precedes
/// dispatch; across recipients the units run concurrently with no
/// ordering guarantee.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    resolver: TargetResolver,
    dispatcher: DeliveryDispatcher,
    config: NotificationsConfig,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        resolver: TargetResolver,
        dispatcher: DeliveryDispatcher,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
            config,
        }
    }

    /// Persist and dispatch a notification to a single recipient.
    ///
    /// Returns the persisted record regardless of the dispatch outcome.
    pub async fn send_to_one(
        &self,
        recipient: UserId,
        content: &NotificationContent,
    ) -> AppResult<SendReceipt> {
        content.validate()?;

        let notification = self.store.create(recipient, content).await?;
        let delivery = self.dispatcher.push(&notification).await;

        info!(
            recipient = %recipient,
            notification_id = %notification.id,
            delivery = ?delivery,
            "Notification sent"
        );

        Ok(SendReceipt {
            notification,
            delivery,
        })
    }

    /// Persist and dispatch a notification to each recipient
    /// independently.
    ///
    /// Fails wholesale only when the recipient set is empty; otherwise
    /// every recipient gets its own result. Duplicate recipients are
    /// collapsed, first occurrence wins.
    pub async fn send_to_many(
        &self,
        recipients: &[UserId],
        content: &NotificationContent,
    ) -> AppResult<Vec<RecipientOutcome>> {
        self.send_to_many_with_cancel(recipients, content, &CancellationToken::new())
            .await
    }

    /// Like [`Self::send_to_many`], honoring a caller-supplied
    /// cancellation signal.
    ///
    /// Cancellation stops launching new per-recipient units; a unit that
    /// has already begun persisting completes its write (no partially
    /// created records), and its dispatch is abandoned as `Skipped`.
    pub async fn send_to_many_with_cancel(
        &self,
        recipients: &[UserId],
        content: &NotificationContent,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RecipientOutcome>> {
        if recipients.is_empty() {
            return Err(AppError::validation("Recipient set is empty"));
        }
        content.validate()?;

        let mut seen = HashSet::with_capacity(recipients.len());
        let unique: Vec<UserId> = recipients
            .iter()
            .copied()
            .filter(|recipient| seen.insert(*recipient))
            .collect();

        let mut slots: Vec<Option<RecipientOutcome>> = Vec::new();
        slots.resize_with(unique.len(), || None);

        let mut units = stream::iter(unique.into_iter().enumerate())
            .map(|(idx, recipient)| async move {
                let result = self.deliver_one(recipient, content, cancel).await;
                (idx, RecipientOutcome { recipient, result })
            })
            .buffer_unordered(self.config.fanout_concurrency.max(1));

        while let Some((idx, outcome)) = units.next().await {
            slots[idx] = Some(outcome);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Resolve a targeting descriptor and fan the notification out to
    /// every resolved recipient.
    ///
    /// A resolution failure aborts the whole call before any record is
    /// written.
    pub async fn send_announcement(
        &self,
        target: &NotificationTarget,
        content: &NotificationContent,
    ) -> AppResult<Vec<RecipientOutcome>> {
        let recipients = self.resolver.resolve(target).await?;
        info!(recipients = recipients.len(), "Announcement target resolved");
        self.send_to_many(&recipients, content).await
    }

    /// Acknowledge a notification on behalf of its recipient.
    ///
    /// Idempotent; propagates `NotFound` unchanged when the record does
    /// not exist for that recipient.
    pub async fn mark_read(
        &self,
        recipient: UserId,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        self.store.mark_read(notification_id, recipient).await
    }

    /// List a recipient's notifications, newest first.
    pub async fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.store.list_for_recipient(recipient, page).await
    }

    /// Count a recipient's unread notifications.
    pub async fn unread_count(&self, recipient: UserId) -> AppResult<i64> {
        self.store.count_unread(recipient).await
    }

    /// One recipient's unit of work: persist, then dispatch.
    async fn deliver_one(
        &self,
        recipient: UserId,
        content: &NotificationContent,
        cancel: &CancellationToken,
    ) -> Result<SendReceipt, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::cancelled("Send cancelled before persistence"));
        }

        let notification = self.store.create(recipient, content).await?;

        // The record is durable from here on; dispatch is best-effort and
        // safe to abandon.
        let delivery = if cancel.is_cancelled() {
            DeliveryOutcome::Skipped
        } else {
            self.dispatcher.push(&notification).await
        };

        Ok(SendReceipt {
            notification,
            delivery,
        })
    }
}
