//! Read-only view of the user/organization directory.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{BatchId, BranchId, CollegeId, UserId};

/// Resolves organizational scopes to their member user IDs.
///
/// Membership reflects current directory state at call time; callers must
/// not cache resolved sets. An unknown scope identifier fails with a
/// `NotFound` error rather than returning an empty set, so that a typo'd
/// scope is distinguishable from a genuinely empty one.
#[async_trait]
pub trait Directory: Send + Sync {
    /// All users belonging to a college.
    async fn members_of_college(&self, college_id: CollegeId) -> AppResult<Vec<UserId>>;

    /// All users belonging to a branch.
    async fn members_of_branch(&self, branch_id: BranchId) -> AppResult<Vec<UserId>>;

    /// All users belonging to a batch.
    async fn members_of_batch(&self, batch_id: BatchId) -> AppResult<Vec<UserId>>;
}
