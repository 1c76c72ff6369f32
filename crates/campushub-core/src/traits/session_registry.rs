//! Live-session registry abstraction.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{SessionId, UserId};

/// Maps a recipient to their currently live sessions and pushes payloads
/// to individual sessions.
///
/// The notification core only reads from the registry — sessions are
/// registered and torn down by the transport layer. Abstracting the
/// registry keeps the dispatcher testable with a fake and portable to a
/// pub/sub-backed multi-node topology.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// IDs of every live session belonging to `user_id`. Empty when the
    /// user has no open sessions.
    async fn live_sessions_of(&self, user_id: UserId) -> Vec<SessionId>;

    /// Push an already-serialized payload to a single session.
    ///
    /// Fails with a `Session` error if the session is unknown, closed,
    /// or its outbound buffer is saturated. A failure affects only the
    /// given session.
    async fn push_to(&self, session_id: SessionId, payload: String) -> AppResult<()>;
}
