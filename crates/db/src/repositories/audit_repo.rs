//! Repository for the `audit_entries` table.

use reelhouse_core::pagination::PageRequest;
use reelhouse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::audit::{AuditEntry, AuditFilter, CreateAuditEntry};

/// Column list for `audit_entries` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, action, entity_type, entity_id, \
    old_value, new_value, title, created_at";

/// Optional filters; a `NULL` parameter disables its condition.
const FILTER: &str = "\
    WHERE ($1::BIGINT IS NULL OR user_id = $1) \
      AND ($2::TEXT IS NULL OR entity_type = $2) \
      AND ($3::TEXT IS NULL OR action = $3)";

/// Provides insert, query and purge operations for history entries.
pub struct AuditRepo;

impl AuditRepo {
    pub async fn insert(pool: &PgPool, input: &CreateAuditEntry) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_entries
                (user_id, action, entity_type, entity_id, old_value, new_value, title)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(input.user_id)
            .bind(input.action.as_str())
            .bind(input.entity_type.as_str())
            .bind(input.entity_id)
            .bind(&input.old_value)
            .bind(&input.new_value)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AuditEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_entries WHERE id = $1");
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of entries matching `filter`, newest first.
    pub async fn query(
        pool: &PgPool,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_entries {FILTER} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(filter.user_id)
            .bind(filter.entity_type.map(|e| e.as_str()))
            .bind(filter.action.map(|a| a.as_str()))
            .bind(page.limit)
            .bind(page.start)
            .fetch_all(pool)
            .await
    }

    /// Count entries matching `filter` (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &AuditFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM audit_entries {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.user_id)
            .bind(filter.entity_type.map(|e| e.as_str()))
            .bind(filter.action.map(|a| a.as_str()))
            .fetch_one(pool)
            .await
    }

    /// Delete entries created before `cutoff`. Returns the number removed.
    pub async fn purge_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_entries WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
