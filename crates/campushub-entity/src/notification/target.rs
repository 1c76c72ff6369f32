//! Notification targeting descriptors.

use serde::{Deserialize, Serialize};

use campushub_core::types::id::{BatchId, BranchId, CollegeId, UserId};

/// Describes who should receive a notification.
///
/// Resolved to concrete recipient identities at send time by the target
/// resolver; never persisted. The closed set of variants keeps scope
/// handling exhaustive at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationTarget {
    /// Every user of a college.
    College {
        /// The college to address.
        college_id: CollegeId,
    },
    /// Every user of a branch.
    Branch {
        /// The branch to address.
        branch_id: BranchId,
    },
    /// Every user of a batch.
    Batch {
        /// The batch to address.
        batch_id: BatchId,
    },
    /// An explicit list of users.
    Users {
        /// The users to address.
        users: Vec<UserId>,
    },
}
