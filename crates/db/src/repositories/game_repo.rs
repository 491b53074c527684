//! Repository for the `games` table.

use reelhouse_core::filter::PipelineStage;
use reelhouse_core::pagination::Page;
use reelhouse_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::game::{CreateGame, Game, UpdateGame};
use crate::pipeline::{self, ListSource};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, genres, tags, status, rating, release_date, \
                       platforms, developer, languages, poster_path, created_at, updated_at";

const SOURCE: ListSource = ListSource {
    table: "games",
    columns: COLUMNS,
};

/// Provides CRUD operations for games.
pub struct GameRepo;

impl GameRepo {
    pub async fn insert(db: impl PgExecutor<'_>, input: &CreateGame) -> Result<Game, sqlx::Error> {
        let query = format!(
            "INSERT INTO games (title, description, genres, tags, status, rating, release_date,
                                platforms, developer, languages)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.genres)
            .bind(&input.tags)
            .bind(&input.status)
            .bind(input.rating)
            .bind(input.release_date)
            .bind(&input.platforms)
            .bind(&input.developer)
            .bind(&input.languages)
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Game>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM games WHERE id = $1");
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of games matching the pipeline, newest first.
    pub async fn list(pool: &PgPool, stages: &[PipelineStage]) -> Result<Page<Game>, sqlx::Error> {
        pipeline::run(pool, SOURCE, stages).await
    }

    /// Update a game. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGame,
    ) -> Result<Option<Game>, sqlx::Error> {
        let query = format!(
            "UPDATE games SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                genres = COALESCE($4, genres),
                tags = COALESCE($5, tags),
                status = COALESCE($6, status),
                rating = COALESCE($7, rating),
                release_date = COALESCE($8, release_date),
                platforms = COALESCE($9, platforms),
                developer = COALESCE($10, developer),
                languages = COALESCE($11, languages),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.genres)
            .bind(&input.tags)
            .bind(&input.status)
            .bind(input.rating)
            .bind(input.release_date)
            .bind(&input.platforms)
            .bind(&input.developer)
            .bind(&input.languages)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_poster(
        pool: &PgPool,
        id: DbId,
        poster_path: &str,
    ) -> Result<Option<Game>, sqlx::Error> {
        let query = format!(
            "UPDATE games SET poster_path = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .bind(poster_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete a game, returning the removed row.
    pub async fn delete(db: impl PgExecutor<'_>, id: DbId) -> Result<Option<Game>, sqlx::Error> {
        let query = format!("DELETE FROM games WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }
}
