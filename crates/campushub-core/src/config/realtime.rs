//! Live-session registry configuration.

use serde::{Deserialize, Serialize};

/// Live-session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum live sessions per user; the oldest is evicted beyond this.
    #[serde(default = "default_max_sessions_per_user")]
    pub max_sessions_per_user: usize,
    /// Outbound buffer size (frames) for each session's queue.
    #[serde(default = "default_session_buffer")]
    pub session_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_user: default_max_sessions_per_user(),
            session_buffer_size: default_session_buffer(),
        }
    }
}

fn default_max_sessions_per_user() -> usize {
    5
}

fn default_session_buffer() -> usize {
    256
}
