//! Session manager — session lifecycle plus the registry seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use campushub_core::config::realtime::RealtimeConfig;
use campushub_core::error::AppError;
use campushub_core::result::AppResult;
use campushub_core::traits::SessionRegistry;
use campushub_core::types::id::{SessionId, UserId};

use super::handle::SessionHandle;
use super::pool::SessionPool;

/// First frame queued on every newly registered session.
#[derive(Serialize)]
struct ConnectedAck {
    #[serde(rename = "type")]
    kind: &'static str,
    session_id: SessionId,
}

/// Manages all live sessions in this process.
///
/// The transport layer registers a session when a connection
/// authenticates and unregisters it on close; the notification core only
/// reads the pool through the [`SessionRegistry`] impl.
#[derive(Debug)]
pub struct SessionManager {
    /// Session pool.
    pool: SessionPool,
    /// Configuration.
    config: RealtimeConfig,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: SessionPool::new(),
            config,
        }
    }

    /// Register a new live session for `user_id`.
    ///
    /// Returns the session handle and the receiver the transport drains
    /// into the connection. A connected-ack frame is queued first. When
    /// the user is at their session cap the oldest session is evicted.
    pub fn register(&self, user_id: UserId) -> (Arc<SessionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.session_buffer_size.max(1));
        let handle = Arc::new(SessionHandle::new(user_id, tx));

        let existing = self.pool.user_sessions(user_id);
        if existing.len() >= self.config.max_sessions_per_user {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    session = %oldest.id,
                    max = self.config.max_sessions_per_user,
                    "User at max sessions, evicting oldest"
                );
                self.unregister(oldest.id);
            }
        }

        self.pool.add(handle.clone());

        let ack = ConnectedAck {
            kind: "connected",
            session_id: handle.id,
        };
        if let Ok(frame) = serde_json::to_string(&ack) {
            let _ = handle.send(frame);
        }

        info!(session = %handle.id, user_id = %user_id, "Session registered");
        (handle, rx)
    }

    /// Unregister a session and mark it closed.
    pub fn unregister(&self, session_id: SessionId) {
        if let Some(handle) = self.pool.remove(session_id) {
            handle.mark_closed();
            info!(session = %session_id, user_id = %handle.user_id, "Session unregistered");
        }
    }

    /// Whether the user has at least one live session.
    pub fn is_online(&self, user_id: UserId) -> bool {
        !self.pool.user_sessions(user_id).is_empty()
    }

    /// Total number of live sessions.
    pub fn session_count(&self) -> usize {
        self.pool.session_count()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }
}

#[async_trait]
impl SessionRegistry for SessionManager {
    async fn live_sessions_of(&self, user_id: UserId) -> Vec<SessionId> {
        self.pool
            .user_sessions(user_id)
            .iter()
            .filter(|handle| !handle.is_closed())
            .map(|handle| handle.id)
            .collect()
    }

    async fn push_to(&self, session_id: SessionId, payload: String) -> AppResult<()> {
        match self.pool.get(session_id) {
            Some(handle) => handle.send(payload),
            None => Err(AppError::session(format!("No live session {session_id}"))),
        }
    }
}
