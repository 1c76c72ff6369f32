//! Notification fan-out configuration.

use serde::{Deserialize, Serialize};

/// Notification fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Maximum per-recipient units of work in flight during a batch send.
    #[serde(default = "default_fanout_concurrency")]
    pub fanout_concurrency: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            fanout_concurrency: default_fanout_concurrency(),
        }
    }
}

fn default_fanout_concurrency() -> usize {
    16
}
