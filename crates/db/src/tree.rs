//! Show → Season → Episode writes and deletes.
//!
//! Every function here runs against a caller-owned connection, normally an
//! open transaction. Any error means the caller must roll back; use
//! [`crate::commit_or_rollback`] to finish the transaction.
//!
//! Children are written and removed strictly in input order.

use std::collections::HashSet;

use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::DbId;
use sqlx::PgConnection;

use crate::error::TreeError;
use crate::models::episode::{Episode, NewEpisode};
use crate::models::season::{CreateSeason, NewSeason, Season, SeasonDeleteCounts};
use crate::models::show::{CreateShow, SeasonTree, ShowDeleteCounts, ShowTree};
use crate::repositories::{CommentRepo, EpisodeRepo, SeasonRepo, ShowRepo};

fn reject_empty<T>(items: &[T], what: &str) -> Result<(), TreeError> {
    if items.is_empty() {
        return Err(CoreError::Validation(format!("{what}: at least one item is required")).into());
    }
    Ok(())
}

/// Drop repeated ids, keeping first-occurrence order.
pub(crate) fn distinct_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Insert one season and its episodes under `show_id`.
async fn insert_season(
    conn: &mut PgConnection,
    show_id: DbId,
    input: &CreateSeason,
) -> Result<(Season, Vec<Episode>), TreeError> {
    let season = SeasonRepo::insert(&mut *conn, show_id, input)
        .await
        .map_err(|source| TreeError::WriteFailed {
            entity: EntityKind::Season,
            label: input.title.clone(),
            source,
        })?;

    let mut episodes = Vec::with_capacity(input.episodes.len());
    for episode_input in &input.episodes {
        let episode = EpisodeRepo::insert(&mut *conn, season.id, episode_input)
            .await
            .map_err(|source| TreeError::WriteFailed {
                entity: EntityKind::Episode,
                label: episode_input.title.clone(),
                source,
            })?;
        episodes.push(episode);
    }

    Ok((season, episodes))
}

/// Insert a show with its nested seasons and episodes.
///
/// The returned tree is rebuilt from the inserted rows, so it carries
/// database ids and timestamps.
pub async fn write_show_tree(
    conn: &mut PgConnection,
    input: &CreateShow,
) -> Result<ShowTree, TreeError> {
    let show = ShowRepo::insert(&mut *conn, input)
        .await
        .map_err(|source| TreeError::WriteFailed {
            entity: EntityKind::TvShow,
            label: input.title.clone(),
            source,
        })?;

    let mut seasons = Vec::with_capacity(input.seasons.len());
    let mut episodes = Vec::new();
    for season_input in &input.seasons {
        let (season, season_episodes) = insert_season(conn, show.id, season_input).await?;
        seasons.push(season);
        episodes.extend(season_episodes);
    }

    tracing::debug!(
        show_id = show.id,
        seasons = seasons.len(),
        episodes = episodes.len(),
        "Show tree written"
    );

    Ok(ShowTree::assemble(show, seasons, episodes))
}

/// Insert several show trees. The first failure aborts the batch.
pub async fn write_show_trees(
    conn: &mut PgConnection,
    inputs: &[CreateShow],
) -> Result<Vec<ShowTree>, TreeError> {
    reject_empty(inputs, "shows")?;
    let mut trees = Vec::with_capacity(inputs.len());
    for input in inputs {
        trees.push(write_show_tree(conn, input).await?);
    }
    Ok(trees)
}

/// Insert a season and its episodes under an existing show.
pub async fn write_season_tree(
    conn: &mut PgConnection,
    input: &NewSeason,
) -> Result<SeasonTree, TreeError> {
    if !ShowRepo::exists(&mut *conn, input.show_id).await? {
        return Err(TreeError::not_found(EntityKind::TvShow, input.show_id));
    }

    let (season, episodes) = insert_season(conn, input.show_id, &input.season).await?;
    tracing::debug!(
        show_id = input.show_id,
        season_id = season.id,
        episodes = episodes.len(),
        "Season tree written"
    );
    Ok(SeasonTree::assemble(season, episodes))
}

pub async fn write_season_trees(
    conn: &mut PgConnection,
    inputs: &[NewSeason],
) -> Result<Vec<SeasonTree>, TreeError> {
    reject_empty(inputs, "seasons")?;
    let mut trees = Vec::with_capacity(inputs.len());
    for input in inputs {
        trees.push(write_season_tree(conn, input).await?);
    }
    Ok(trees)
}

/// Insert an episode under an existing season.
pub async fn write_episode(
    conn: &mut PgConnection,
    input: &NewEpisode,
) -> Result<Episode, TreeError> {
    if !SeasonRepo::exists(&mut *conn, input.season_id).await? {
        return Err(TreeError::not_found(EntityKind::Season, input.season_id));
    }

    EpisodeRepo::insert(&mut *conn, input.season_id, &input.episode)
        .await
        .map_err(|source| TreeError::WriteFailed {
            entity: EntityKind::Episode,
            label: input.episode.title.clone(),
            source,
        })
}

pub async fn write_episodes(
    conn: &mut PgConnection,
    inputs: &[NewEpisode],
) -> Result<Vec<Episode>, TreeError> {
    reject_empty(inputs, "episodes")?;
    let mut episodes = Vec::with_capacity(inputs.len());
    for input in inputs {
        episodes.push(write_episode(conn, input).await?);
    }
    Ok(episodes)
}

// ---------------------------------------------------------------------------
// Deleter
// ---------------------------------------------------------------------------

/// Delete the episodes of each season, then the seasons themselves.
/// Comments on the removed rows go with them.
async fn delete_seasons(
    conn: &mut PgConnection,
    season_ids: &[DbId],
) -> Result<SeasonDeleteCounts, TreeError> {
    let mut counts = SeasonDeleteCounts::default();
    if season_ids.is_empty() {
        return Ok(counts);
    }

    CommentRepo::delete_for_season_episodes(&mut *conn, season_ids).await?;
    CommentRepo::delete_for_targets(&mut *conn, EntityKind::Season, season_ids).await?;

    for &season_id in season_ids {
        counts.episodes += EpisodeRepo::delete_for_season(&mut *conn, season_id)
            .await
            .map_err(|source| TreeError::DeleteFailed {
                entity: EntityKind::Episode,
                id: season_id,
                source,
            })?;
    }

    counts.seasons = SeasonRepo::delete_by_ids(&mut *conn, season_ids)
        .await
        .map_err(|source| TreeError::DeleteFailed {
            entity: EntityKind::Season,
            id: season_ids[0],
            source,
        })?;

    Ok(counts)
}

/// Delete a show with all of its seasons and episodes.
///
/// Children go first. A missing show fails with `NotFound` even after
/// children were removed, so the caller's rollback restores them.
pub async fn delete_show_tree(
    conn: &mut PgConnection,
    show_id: DbId,
) -> Result<ShowDeleteCounts, TreeError> {
    let season_ids = SeasonRepo::ids_for_show(&mut *conn, show_id).await?;
    let children = delete_seasons(conn, &season_ids).await?;
    CommentRepo::delete_for_targets(&mut *conn, EntityKind::TvShow, &[show_id]).await?;

    let removed = ShowRepo::delete(&mut *conn, show_id)
        .await
        .map_err(|source| TreeError::DeleteFailed {
            entity: EntityKind::TvShow,
            id: show_id,
            source,
        })?;
    if removed == 0 {
        return Err(TreeError::not_found(EntityKind::TvShow, show_id));
    }

    tracing::debug!(
        show_id,
        seasons = children.seasons,
        episodes = children.episodes,
        "Show tree deleted"
    );

    Ok(ShowDeleteCounts {
        tv_show: removed,
        seasons: children.seasons,
        episodes: children.episodes,
    })
}

/// Delete several show trees, accumulating counts. Repeated ids count
/// once; any missing id aborts the batch.
pub async fn delete_show_trees(
    conn: &mut PgConnection,
    show_ids: &[DbId],
) -> Result<ShowDeleteCounts, TreeError> {
    reject_empty(show_ids, "ids")?;
    let mut total = ShowDeleteCounts::default();
    for show_id in distinct_ids(show_ids) {
        total += delete_show_tree(conn, show_id).await?;
    }
    Ok(total)
}

/// Delete a season with all of its episodes.
pub async fn delete_season_tree(
    conn: &mut PgConnection,
    season_id: DbId,
) -> Result<SeasonDeleteCounts, TreeError> {
    let counts = delete_seasons(conn, &[season_id]).await?;
    if counts.seasons == 0 {
        return Err(TreeError::not_found(EntityKind::Season, season_id));
    }
    tracing::debug!(season_id, episodes = counts.episodes, "Season tree deleted");
    Ok(counts)
}

pub async fn delete_season_trees(
    conn: &mut PgConnection,
    season_ids: &[DbId],
) -> Result<SeasonDeleteCounts, TreeError> {
    reject_empty(season_ids, "ids")?;
    let mut total = SeasonDeleteCounts::default();
    for season_id in distinct_ids(season_ids) {
        total += delete_season_tree(conn, season_id).await?;
    }
    Ok(total)
}

/// Delete one episode and its comments, returning the removed row.
pub async fn delete_episode(conn: &mut PgConnection, id: DbId) -> Result<Episode, TreeError> {
    CommentRepo::delete_for_targets(&mut *conn, EntityKind::Episode, &[id]).await?;
    EpisodeRepo::delete(&mut *conn, id)
        .await
        .map_err(|source| TreeError::DeleteFailed {
            entity: EntityKind::Episode,
            id,
            source,
        })?
        .ok_or_else(|| TreeError::not_found(EntityKind::Episode, id))
}

/// Delete several episodes. Any missing id aborts the batch.
pub async fn delete_episodes(conn: &mut PgConnection, ids: &[DbId]) -> Result<u64, TreeError> {
    reject_empty(ids, "ids")?;
    let mut deleted = 0;
    for id in distinct_ids(ids) {
        delete_episode(conn, id).await?;
        deleted += 1;
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_keeps_first_occurrence_order() {
        assert_eq!(distinct_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(distinct_ids(&[]).is_empty());
    }
}
