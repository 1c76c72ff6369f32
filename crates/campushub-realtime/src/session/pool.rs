//! Session pool — tracks all live sessions indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;

use campushub_core::types::id::{SessionId, UserId};

use super::handle::SessionHandle;

/// Thread-safe pool of all live sessions.
#[derive(Debug, Default)]
pub struct SessionPool {
    /// User ID → session handles (one user can have several sessions).
    by_user: DashMap<UserId, Vec<Arc<SessionHandle>>>,
    /// Session ID → handle for direct lookup.
    by_id: DashMap<SessionId, Arc<SessionHandle>>,
}

impl SessionPool {
    /// Create a new empty session pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to the pool.
    pub fn add(&self, handle: Arc<SessionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Remove a session from the pool.
    pub fn remove(&self, session_id: SessionId) -> Option<Arc<SessionHandle>> {
        let (_, handle) = self.by_id.remove(&session_id)?;
        if let Some(mut sessions) = self.by_user.get_mut(&handle.user_id) {
            sessions.retain(|s| s.id != session_id);
            if sessions.is_empty() {
                drop(sessions);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Get a specific session by ID.
    pub fn get(&self, session_id: SessionId) -> Option<Arc<SessionHandle>> {
        self.by_id.get(&session_id).map(|entry| entry.value().clone())
    }

    /// Get all sessions for a user, oldest first.
    pub fn user_sessions(&self, user_id: UserId) -> Vec<Arc<SessionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of live sessions.
    pub fn session_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}
