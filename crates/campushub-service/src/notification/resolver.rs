//! Target resolution — converts a targeting descriptor into a concrete
//! recipient set.

use std::collections::HashSet;
use std::sync::Arc;

use campushub_core::error::{AppError, ErrorKind};
use campushub_core::result::AppResult;
use campushub_core::traits::Directory;
use campushub_core::types::id::UserId;
use campushub_entity::notification::NotificationTarget;

/// Resolves a [`NotificationTarget`] to a deduplicated set of recipients.
///
/// Resolution is a pure read of current directory state — no caching, no
/// side effects. An unknown scope or an empty explicit list fails with a
/// `Resolution` error before any notification is written.
#[derive(Clone)]
pub struct TargetResolver {
    directory: Arc<dyn Directory>,
}

impl TargetResolver {
    /// Create a new target resolver.
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Resolve `target` to recipient identities, first occurrence wins on
    /// overlapping memberships.
    pub async fn resolve(&self, target: &NotificationTarget) -> AppResult<Vec<UserId>> {
        let members = match target {
            NotificationTarget::College { college_id } => {
                as_resolution(self.directory.members_of_college(*college_id).await)?
            }
            NotificationTarget::Branch { branch_id } => {
                as_resolution(self.directory.members_of_branch(*branch_id).await)?
            }
            NotificationTarget::Batch { batch_id } => {
                as_resolution(self.directory.members_of_batch(*batch_id).await)?
            }
            NotificationTarget::Users { users } => {
                if users.is_empty() {
                    return Err(AppError::resolution("Explicit recipient list is empty"));
                }
                users.clone()
            }
        };

        let mut seen = HashSet::with_capacity(members.len());
        let mut unique = members;
        unique.retain(|user| seen.insert(*user));
        Ok(unique)
    }
}

/// Re-wrap a directory `NotFound` as a `Resolution` failure; other errors
/// pass through unchanged.
fn as_resolution(result: AppResult<Vec<UserId>>) -> AppResult<Vec<UserId>> {
    result.map_err(|e| match e.kind {
        ErrorKind::NotFound => AppError::new(ErrorKind::Resolution, e.message),
        _ => e,
    })
}
