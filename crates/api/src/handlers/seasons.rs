//! Handlers for the `/seasons` resource.

use axum::extract::State;
use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::commit_or_rollback;
use reelhouse_db::models::episode::Episode;
use reelhouse_db::models::season::{NewSeason, Season, SeasonDeleteCounts, UpdateSeason};
use reelhouse_db::models::show::SeasonTree;
use reelhouse_db::repositories::{EpisodeRepo, SeasonRepo};
use reelhouse_db::tree;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::{check_each, page_request, BulkIds};
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonsDeleted {
    pub deleted_count: SeasonDeleteCounts,
}

fn season_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::Season.label(), id))
}

async fn find_season(state: &AppState, id: DbId) -> AppResult<Season> {
    SeasonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| season_not_found(id))
}

/// POST /api/v1/seasons
///
/// Add a season, with nested episodes, under an existing show.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<NewSeason>,
) -> AppResult<Audited<SeasonTree>> {
    input.validate()?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_season_tree(&mut tx, &input).await;
    let season = commit_or_rollback(tx, result).await?;

    tracing::info!(
        show_id = input.show_id,
        season_id = season.season.id,
        episodes = season.episodes.len(),
        user_id = admin.user_id,
        "Season created"
    );

    let audit = AuditContext::new(EntityKind::Season, &admin).after(&season);
    Ok(Audited::new(season, audit).with_message("Season created"))
}

/// POST /api/v1/seasons/bulk
pub async fn create_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(inputs): AppJson<Vec<NewSeason>>,
) -> AppResult<Audited<Vec<SeasonTree>>> {
    check_each(&inputs, |input| input.validate().map_err(CoreError::from))?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_season_trees(&mut tx, &inputs).await;
    let seasons = commit_or_rollback(tx, result).await?;

    tracing::info!(count = seasons.len(), user_id = admin.user_id, "Seasons created");

    let audit = AuditContext::new(EntityKind::Season, &admin)
        .bulk()
        .after(&seasons);
    Ok(Audited::new(seasons, audit))
}

/// GET /api/v1/seasons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<Season>> {
    Ok(ApiResponse::ok(find_season(&state, id).await?))
}

/// PUT /api/v1/seasons/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateSeason>,
) -> AppResult<Audited<Season>> {
    input.validate()?;

    let before = find_season(&state, id).await?;
    let season = SeasonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| season_not_found(id))?;

    tracing::info!(season_id = id, user_id = admin.user_id, "Season updated");
    let audit = AuditContext::new(EntityKind::Season, &admin)
        .before(&before)
        .after(&season);
    Ok(Audited::new(season, audit))
}

/// DELETE /api/v1/seasons/{id}
///
/// Delete the season and its episodes.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<SeasonsDeleted>> {
    let before = SeasonRepo::find_by_id(&state.pool, id).await?;

    let mut tx = state.pool.begin().await?;
    let result = tree::delete_season_tree(&mut tx, id).await;
    let counts = commit_or_rollback(tx, result).await?;

    tracing::info!(
        season_id = id,
        episodes = counts.episodes,
        user_id = admin.user_id,
        "Season deleted"
    );

    let audit = AuditContext::new(EntityKind::Season, &admin).before(&before);
    Ok(Audited::new(
        SeasonsDeleted {
            deleted_count: counts,
        },
        audit,
    )
    .with_message("Season deleted"))
}

/// DELETE /api/v1/seasons/bulk
pub async fn delete_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<BulkIds>,
) -> AppResult<Audited<SeasonsDeleted>> {
    let mut tx = state.pool.begin().await?;
    let result = tree::delete_season_trees(&mut tx, &input.ids).await;
    let counts = commit_or_rollback(tx, result).await?;

    tracing::info!(
        seasons = counts.seasons,
        episodes = counts.episodes,
        user_id = admin.user_id,
        "Seasons deleted"
    );

    let audit = AuditContext::new(EntityKind::Season, &admin)
        .bulk()
        .before(&input.ids);
    Ok(Audited::new(
        SeasonsDeleted {
            deleted_count: counts,
        },
        audit,
    ))
}

/// GET /api/v1/seasons/{id}/episodes
pub async fn list_episodes(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<Episode>>> {
    if !SeasonRepo::exists(&state.pool, id).await? {
        return Err(season_not_found(id));
    }

    let page = page_request(&state, &raw);
    let episodes = EpisodeRepo::list_for_season(&state.pool, id, page).await?;
    let total = EpisodeRepo::count_for_season(&state.pool, id).await?;
    Ok(ApiResponse::ok(Page::new(episodes, total, page)))
}
