//! Repository for the `episodes` table.

use reelhouse_core::pagination::PageRequest;
use reelhouse_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::episode::{CreateEpisode, Episode, UpdateEpisode};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, season_id, episode_number, title, run_time, air_date, description, \
                       created_at, updated_at";

/// Provides CRUD operations for episodes.
pub struct EpisodeRepo;

impl EpisodeRepo {
    pub async fn insert(
        db: impl PgExecutor<'_>,
        season_id: DbId,
        input: &CreateEpisode,
    ) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (season_id, episode_number, title, run_time, air_date, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(season_id)
            .bind(input.episode_number)
            .bind(&input.title)
            .bind(input.run_time)
            .bind(input.air_date)
            .bind(&input.description)
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(
        db: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// One page of a season's episodes ordered by episode number.
    pub async fn list_for_season(
        pool: &PgPool,
        season_id: DbId,
        page: PageRequest,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes WHERE season_id = $1
             ORDER BY episode_number, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(season_id)
            .bind(page.limit)
            .bind(page.start)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_season(pool: &PgPool, season_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM episodes WHERE season_id = $1")
            .bind(season_id)
            .fetch_one(pool)
            .await
    }

    /// All episodes of the given seasons, in insertion order.
    pub async fn list_for_seasons(
        db: impl PgExecutor<'_>,
        season_ids: &[DbId],
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM episodes WHERE season_id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Episode>(&query)
            .bind(season_ids)
            .fetch_all(db)
            .await
    }

    /// Update an episode. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEpisode,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET
                episode_number = COALESCE($2, episode_number),
                title = COALESCE($3, title),
                run_time = COALESCE($4, run_time),
                air_date = COALESCE($5, air_date),
                description = COALESCE($6, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .bind(input.episode_number)
            .bind(&input.title)
            .bind(input.run_time)
            .bind(input.air_date)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete every episode of a season. Returns the number removed.
    pub async fn delete_for_season(
        db: impl PgExecutor<'_>,
        season_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM episodes WHERE season_id = $1")
            .bind(season_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete one episode, returning the removed row.
    pub async fn delete(db: impl PgExecutor<'_>, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("DELETE FROM episodes WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }
}
