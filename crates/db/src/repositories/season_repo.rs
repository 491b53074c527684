//! Repository for the `seasons` table.

use reelhouse_core::pagination::PageRequest;
use reelhouse_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::season::{CreateSeason, Season, UpdateSeason};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, show_id, season_number, title, episode_count, release_date, created_at, updated_at";

/// Provides CRUD operations for seasons.
pub struct SeasonRepo;

impl SeasonRepo {
    /// Insert a season under `show_id`. Nested episodes are not written here.
    pub async fn insert(
        db: impl PgExecutor<'_>,
        show_id: DbId,
        input: &CreateSeason,
    ) -> Result<Season, sqlx::Error> {
        let query = format!(
            "INSERT INTO seasons (show_id, season_number, title, episode_count, release_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(show_id)
            .bind(input.season_number)
            .bind(&input.title)
            .bind(input.episode_count)
            .bind(input.release_date)
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(
        db: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE id = $1");
        sqlx::query_as::<_, Season>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn exists(db: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM seasons WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
    }

    /// Ids of every season of a show, in insertion order.
    pub async fn ids_for_show(
        db: impl PgExecutor<'_>,
        show_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM seasons WHERE show_id = $1 ORDER BY id")
            .bind(show_id)
            .fetch_all(db)
            .await
    }

    /// One page of a show's seasons ordered by season number.
    pub async fn list_for_show(
        pool: &PgPool,
        show_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Season>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seasons WHERE show_id = $1
             ORDER BY season_number, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(show_id)
            .bind(page.limit)
            .bind(page.start)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_show(pool: &PgPool, show_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seasons WHERE show_id = $1")
            .bind(show_id)
            .fetch_one(pool)
            .await
    }

    /// All seasons of the given shows, in insertion order.
    pub async fn list_for_shows(
        db: impl PgExecutor<'_>,
        show_ids: &[DbId],
    ) -> Result<Vec<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE show_id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Season>(&query)
            .bind(show_ids)
            .fetch_all(db)
            .await
    }

    /// Update a season. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSeason,
    ) -> Result<Option<Season>, sqlx::Error> {
        let query = format!(
            "UPDATE seasons SET
                season_number = COALESCE($2, season_number),
                title = COALESCE($3, title),
                episode_count = COALESCE($4, episode_count),
                release_date = COALESCE($5, release_date),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(id)
            .bind(input.season_number)
            .bind(&input.title)
            .bind(input.episode_count)
            .bind(input.release_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete the given seasons. Their episodes must already be gone.
    pub async fn delete_by_ids(db: impl PgExecutor<'_>, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = ANY($1)")
            .bind(ids)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
