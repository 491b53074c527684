//! Repository for the `shows` table.

use reelhouse_core::filter::PipelineStage;
use reelhouse_core::pagination::Page;
use reelhouse_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::show::{CreateShow, Show, UpdateShow};
use crate::pipeline::{self, ListSource};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, genres, tags, status, rating, release_date, \
                       languages, total_seasons, total_episodes, poster_path, created_at, updated_at";

const SOURCE: ListSource = ListSource {
    table: "shows",
    columns: COLUMNS,
};

/// Provides CRUD operations for shows. Seasons and episodes are handled by
/// [`crate::tree`].
pub struct ShowRepo;

impl ShowRepo {
    /// Insert the show's own fields, returning the created row.
    pub async fn insert(db: impl PgExecutor<'_>, input: &CreateShow) -> Result<Show, sqlx::Error> {
        let query = format!(
            "INSERT INTO shows (title, description, genres, tags, status, rating, release_date,
                                languages, total_seasons, total_episodes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Show>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.genres)
            .bind(&input.tags)
            .bind(&input.status)
            .bind(input.rating)
            .bind(input.release_date)
            .bind(&input.languages)
            .bind(input.total_seasons)
            .bind(input.total_episodes)
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(db: impl PgExecutor<'_>, id: DbId) -> Result<Option<Show>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shows WHERE id = $1");
        sqlx::query_as::<_, Show>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn exists(db: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
    }

    /// One page of shows matching the pipeline, newest first.
    pub async fn list(pool: &PgPool, stages: &[PipelineStage]) -> Result<Page<Show>, sqlx::Error> {
        pipeline::run(pool, SOURCE, stages).await
    }

    /// Update a show. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateShow,
    ) -> Result<Option<Show>, sqlx::Error> {
        let query = format!(
            "UPDATE shows SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                genres = COALESCE($4, genres),
                tags = COALESCE($5, tags),
                status = COALESCE($6, status),
                rating = COALESCE($7, rating),
                release_date = COALESCE($8, release_date),
                languages = COALESCE($9, languages),
                total_seasons = COALESCE($10, total_seasons),
                total_episodes = COALESCE($11, total_episodes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Show>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.genres)
            .bind(&input.tags)
            .bind(&input.status)
            .bind(input.rating)
            .bind(input.release_date)
            .bind(&input.languages)
            .bind(input.total_seasons)
            .bind(input.total_episodes)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_poster(
        pool: &PgPool,
        id: DbId,
        poster_path: &str,
    ) -> Result<Option<Show>, sqlx::Error> {
        let query = format!(
            "UPDATE shows SET poster_path = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Show>(&query)
            .bind(id)
            .bind(poster_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete the show row only. Fails with a foreign-key error while
    /// seasons still reference it. Returns the number of rows removed.
    pub async fn delete(db: impl PgExecutor<'_>, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shows WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
