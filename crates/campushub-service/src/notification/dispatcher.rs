//! Delivery dispatch — best-effort push of persisted notifications to
//! live sessions.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use campushub_core::traits::SessionRegistry;
use campushub_entity::notification::Notification;

/// Outcome of a dispatch attempt for one notification.
///
/// Never an error: the durable record is the source of truth, and a missed
/// push is recoverable by the client listing its notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The recipient had no live sessions; nothing was pushed.
    Skipped,
    /// Every live session accepted the push.
    Delivered {
        /// Number of sessions reached.
        sessions: usize,
    },
    /// Some sessions accepted the push, some failed.
    PartiallyFailed {
        /// Number of sessions reached.
        delivered: usize,
        /// Number of sessions that failed.
        failed: usize,
    },
    /// Sessions existed but none accepted the push.
    AllFailed {
        /// Number of sessions attempted.
        sessions: usize,
    },
}

impl DeliveryOutcome {
    /// Whether at least one session received the notification.
    pub fn reached_any(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::PartiallyFailed { .. })
    }
}

/// Wire envelope pushed to a live session. The `type` tag lets a client
/// distinguish this push from other real-time message kinds on the same
/// transport.
#[derive(Serialize)]
struct PushEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a Notification,
}

/// Pushes persisted notifications to every live session of their
/// recipient.
///
/// Fire-and-forget with respect to the persisted record: a failed push is
/// reported in the outcome, never retried here, and never rolls the
/// record back.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    registry: Arc<dyn SessionRegistry>,
}

impl DeliveryDispatcher {
    /// Create a new dispatcher over a session registry.
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Push `notification` to every live session of its recipient.
    pub async fn push(&self, notification: &Notification) -> DeliveryOutcome {
        let sessions = self.registry.live_sessions_of(notification.user_id).await;
        if sessions.is_empty() {
            debug!(
                recipient = %notification.user_id,
                notification_id = %notification.id,
                "No live sessions, push skipped"
            );
            return DeliveryOutcome::Skipped;
        }

        let envelope = PushEnvelope {
            kind: "notification",
            data: notification,
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "Failed to serialize notification push");
                return DeliveryOutcome::AllFailed {
                    sessions: sessions.len(),
                };
            }
        };

        let mut delivered = 0;
        let mut failed = 0;
        for session in &sessions {
            match self.registry.push_to(*session, payload.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(session = %session, error = %e, "Push to session failed");
                    failed += 1;
                }
            }
        }

        match (delivered, failed) {
            (0, failed) => DeliveryOutcome::AllFailed { sessions: failed },
            (delivered, 0) => DeliveryOutcome::Delivered {
                sessions: delivered,
            },
            (delivered, failed) => DeliveryOutcome::PartiallyFailed { delivered, failed },
        }
    }
}
