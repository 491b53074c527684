//! Repository for the `comments` table.

use reelhouse_core::media::{EntityKind, MediaRef};
use reelhouse_core::pagination::PageRequest;
use reelhouse_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::comment::{Comment, CreateComment};

/// Columns of a comment joined with its author (`c` = comments, `u` = users).
const JOINED_COLUMNS: &str = "c.id, c.user_id, u.username, c.target_kind, c.target_id, c.body, \
                              c.created_at, c.updated_at";

/// Table holding the media a reference points at.
fn target_table(target: MediaRef) -> &'static str {
    match target {
        MediaRef::Movie(_) => "movies",
        MediaRef::Game(_) => "games",
        MediaRef::TvShow(_) => "shows",
        MediaRef::Season(_) => "seasons",
        MediaRef::Episode(_) => "episodes",
    }
}

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Whether the referenced media item exists.
    pub async fn target_exists(pool: &PgPool, target: MediaRef) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            target_table(target)
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(target.id())
            .fetch_one(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (user_id, target_kind, target_id, body)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM c JOIN users u ON u.id = c.user_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(user_id)
            .bind(input.target.entity_kind().as_str())
            .bind(input.target.id())
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of comments on a target, newest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target: MediaRef,
        page: PageRequest,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.target_kind = $1 AND c.target_id = $2
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(target.entity_kind().as_str())
            .bind(target.id())
            .bind(page.limit)
            .bind(page.start)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_target(pool: &PgPool, target: MediaRef) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.entity_kind().as_str())
        .bind(target.id())
        .fetch_one(pool)
        .await
    }

    pub async fn update_body(
        pool: &PgPool,
        id: DbId,
        body: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET body = $2, updated_at = NOW() WHERE id = $1 RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM c JOIN users u ON u.id = c.user_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(body)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every comment on the given targets of one kind.
    pub async fn delete_for_targets(
        db: impl PgExecutor<'_>,
        kind: EntityKind,
        target_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM comments WHERE target_kind = $1 AND target_id = ANY($2)")
                .bind(kind.as_str())
                .bind(target_ids)
                .execute(db)
                .await?;
        Ok(result.rows_affected())
    }

    /// Remove every comment on the episodes of the given seasons.
    pub async fn delete_for_season_episodes(
        db: impl PgExecutor<'_>,
        season_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM comments
             WHERE target_kind = $1
               AND target_id IN (SELECT id FROM episodes WHERE season_id = ANY($2))",
        )
        .bind(EntityKind::Episode.as_str())
        .bind(season_ids)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}
