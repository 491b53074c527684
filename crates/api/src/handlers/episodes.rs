//! Handlers for the `/episodes` resource.

use axum::extract::State;
use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::DbId;
use reelhouse_db::commit_or_rollback;
use reelhouse_db::models::episode::{Episode, NewEpisode, UpdateEpisode};
use reelhouse_db::repositories::EpisodeRepo;
use reelhouse_db::tree;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::{check_each, BulkIds};
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodesDeleted {
    pub deleted_count: u64,
}

fn episode_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::Episode.label(), id))
}

async fn find_episode(state: &AppState, id: DbId) -> AppResult<Episode> {
    EpisodeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| episode_not_found(id))
}

/// POST /api/v1/episodes
///
/// The parent season must exist.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<NewEpisode>,
) -> AppResult<Audited<Episode>> {
    input.validate()?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_episode(&mut tx, &input).await;
    let episode = commit_or_rollback(tx, result).await?;

    tracing::info!(
        episode_id = episode.id,
        season_id = episode.season_id,
        user_id = admin.user_id,
        "Episode created"
    );

    let audit = AuditContext::new(EntityKind::Episode, &admin).after(&episode);
    Ok(Audited::new(episode, audit).with_message("Episode created"))
}

/// POST /api/v1/episodes/bulk
pub async fn create_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(inputs): AppJson<Vec<NewEpisode>>,
) -> AppResult<Audited<Vec<Episode>>> {
    check_each(&inputs, |input| input.validate().map_err(CoreError::from))?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_episodes(&mut tx, &inputs).await;
    let episodes = commit_or_rollback(tx, result).await?;

    tracing::info!(count = episodes.len(), user_id = admin.user_id, "Episodes created");

    let audit = AuditContext::new(EntityKind::Episode, &admin)
        .bulk()
        .after(&episodes);
    Ok(Audited::new(episodes, audit))
}

/// GET /api/v1/episodes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<Episode>> {
    Ok(ApiResponse::ok(find_episode(&state, id).await?))
}

/// PUT /api/v1/episodes/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateEpisode>,
) -> AppResult<Audited<Episode>> {
    input.validate()?;

    let before = find_episode(&state, id).await?;
    let episode = EpisodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| episode_not_found(id))?;

    tracing::info!(episode_id = id, user_id = admin.user_id, "Episode updated");
    let audit = AuditContext::new(EntityKind::Episode, &admin)
        .before(&before)
        .after(&episode);
    Ok(Audited::new(episode, audit))
}

/// DELETE /api/v1/episodes/{id}
///
/// Returns the deleted episode.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<Episode>> {
    let mut tx = state.pool.begin().await?;
    let result = tree::delete_episode(&mut tx, id).await;
    let episode = commit_or_rollback(tx, result).await?;

    tracing::info!(episode_id = id, user_id = admin.user_id, "Episode deleted");
    let audit = AuditContext::new(EntityKind::Episode, &admin).before(&episode);
    Ok(Audited::new(episode, audit).with_message("Episode deleted"))
}

/// DELETE /api/v1/episodes/bulk
pub async fn delete_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<BulkIds>,
) -> AppResult<Audited<EpisodesDeleted>> {
    let mut tx = state.pool.begin().await?;
    let result = tree::delete_episodes(&mut tx, &input.ids).await;
    let deleted = commit_or_rollback(tx, result).await?;

    tracing::info!(count = deleted, user_id = admin.user_id, "Episodes deleted");
    let audit = AuditContext::new(EntityKind::Episode, &admin)
        .bulk()
        .before(&input.ids);
    Ok(Audited::new(
        EpisodesDeleted {
            deleted_count: deleted,
        },
        audit,
    ))
}
