//! All-or-nothing batch writes and deletes for movies and games.
//!
//! Like [`crate::tree`], these run on a caller-owned transaction and any
//! error means roll back.

use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::DbId;
use sqlx::PgConnection;

use crate::error::TreeError;
use crate::models::game::{CreateGame, Game};
use crate::models::movie::{CreateMovie, Movie};
use crate::repositories::{CommentRepo, GameRepo, MovieRepo};
use crate::tree::distinct_ids;

fn reject_empty<T>(items: &[T]) -> Result<(), TreeError> {
    if items.is_empty() {
        return Err(CoreError::Validation("at least one item is required".into()).into());
    }
    Ok(())
}

pub async fn create_movies(
    conn: &mut PgConnection,
    inputs: &[CreateMovie],
) -> Result<Vec<Movie>, TreeError> {
    reject_empty(inputs)?;
    let mut movies = Vec::with_capacity(inputs.len());
    for input in inputs {
        let movie = MovieRepo::insert(&mut *conn, input)
            .await
            .map_err(|source| TreeError::WriteFailed {
                entity: EntityKind::Movie,
                label: input.title.clone(),
                source,
            })?;
        movies.push(movie);
    }
    Ok(movies)
}

/// Delete one movie and its comments, returning the removed row.
pub async fn delete_movie(conn: &mut PgConnection, id: DbId) -> Result<Movie, TreeError> {
    CommentRepo::delete_for_targets(&mut *conn, EntityKind::Movie, &[id]).await?;
    MovieRepo::delete(&mut *conn, id)
        .await
        .map_err(|source| TreeError::DeleteFailed {
            entity: EntityKind::Movie,
            id,
            source,
        })?
        .ok_or_else(|| TreeError::not_found(EntityKind::Movie, id))
}

pub async fn delete_movies(conn: &mut PgConnection, ids: &[DbId]) -> Result<u64, TreeError> {
    reject_empty(ids)?;
    let ids = distinct_ids(ids);
    for &id in &ids {
        delete_movie(conn, id).await?;
    }
    Ok(ids.len() as u64)
}

pub async fn create_games(
    conn: &mut PgConnection,
    inputs: &[CreateGame],
) -> Result<Vec<Game>, TreeError> {
    reject_empty(inputs)?;
    let mut games = Vec::with_capacity(inputs.len());
    for input in inputs {
        let game = GameRepo::insert(&mut *conn, input)
            .await
            .map_err(|source| TreeError::WriteFailed {
                entity: EntityKind::Game,
                label: input.title.clone(),
                source,
            })?;
        games.push(game);
    }
    Ok(games)
}

/// Delete one game and its comments, returning the removed row.
pub async fn delete_game(conn: &mut PgConnection, id: DbId) -> Result<Game, TreeError> {
    CommentRepo::delete_for_targets(&mut *conn, EntityKind::Game, &[id]).await?;
    GameRepo::delete(&mut *conn, id)
        .await
        .map_err(|source| TreeError::DeleteFailed {
            entity: EntityKind::Game,
            id,
            source,
        })?
        .ok_or_else(|| TreeError::not_found(EntityKind::Game, id))
}

pub async fn delete_games(conn: &mut PgConnection, ids: &[DbId]) -> Result<u64, TreeError> {
    reject_empty(ids)?;
    let ids = distinct_ids(ids);
    for &id in &ids {
        delete_game(conn, id).await?;
    }
    Ok(ids.len() as u64)
}
