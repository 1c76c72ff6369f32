//! Directory repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use campushub_core::error::{AppError, ErrorKind};
use campushub_core::result::AppResult;
use campushub_core::traits::Directory;
use campushub_core::types::id::{BatchId, BranchId, CollegeId, UserId};

/// PostgreSQL-backed implementation of the [`Directory`] seam.
///
/// Scope membership is flattened onto the `users` table (college, branch,
/// and batch columns), so each lookup is an existence probe on the scope
/// table followed by a single membership query.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scope_members(
        &self,
        scope_table: &str,
        member_column: &str,
        scope_id: Uuid,
    ) -> AppResult<Vec<UserId>> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {scope_table} WHERE id = $1)"
        ))
        .bind(scope_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Failed to look up {scope_table}"), e)
        })?;

        if !exists {
            return Err(AppError::not_found(format!(
                "Unknown scope {scope_id} in {scope_table}"
            )));
        }

        sqlx::query_scalar::<_, UserId>(&format!(
            "SELECT id FROM users WHERE {member_column} = $1"
        ))
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list scope members", e)
        })
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn members_of_college(&self, college_id: CollegeId) -> AppResult<Vec<UserId>> {
        self.scope_members("colleges", "college_id", college_id.into_uuid())
            .await
    }

    async fn members_of_branch(&self, branch_id: BranchId) -> AppResult<Vec<UserId>> {
        self.scope_members("branches", "branch_id", branch_id.into_uuid())
            .await
    }

    async fn members_of_batch(&self, batch_id: BatchId) -> AppResult<Vec<UserId>> {
        self.scope_members("batches", "batch_id", batch_id.into_uuid())
            .await
    }
}
