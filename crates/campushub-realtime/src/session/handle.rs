//! Individual live-session handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use campushub_core::error::AppError;
use campushub_core::result::AppResult;
use campushub_core::types::id::{SessionId, UserId};

/// A handle to a single live session.
///
/// Holds the sender half of the session's outbound frame queue plus
/// metadata about the connected user. The transport owns the receiver
/// half and drains it into the actual connection.
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique session ID.
    pub id: SessionId,
    /// User who owns this session.
    pub user_id: UserId,
    /// When the session was established.
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames.
    sender: mpsc::Sender<String>,
    /// Whether the session has been closed.
    closed: AtomicBool,
}

impl SessionHandle {
    /// Create a new session handle.
    pub(crate) fn new(user_id: UserId, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            connected_at: Utc::now(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Queue an outbound frame on this session.
    ///
    /// A full buffer or a dropped receiver fails this session only.
    pub fn send(&self, payload: String) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::session(format!("Session {} is closed", self.id)));
        }
        match self.sender.try_send(payload) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(session = %self.id, "Session send buffer full, dropping frame");
                Err(AppError::session(format!(
                    "Session {} send buffer full",
                    self.id
                )))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                Err(AppError::session(format!(
                    "Session {} receiver dropped",
                    self.id
                )))
            }
        }
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark the session as closed.
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_after_close_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let handle = SessionHandle::new(UserId::new(), tx);
        handle.mark_closed();
        assert!(handle.send("frame".to_string()).is_err());
    }

    #[test]
    fn test_dropped_receiver_marks_closed() {
        let (tx, rx) = mpsc::channel(4);
        let handle = SessionHandle::new(UserId::new(), tx);
        drop(rx);
        assert!(handle.send("frame".to_string()).is_err());
        assert!(handle.is_closed());
    }
}
