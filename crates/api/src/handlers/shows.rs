//! Handlers for the `/tv-show` resource.
//!
//! Creates and deletes go through the show tree writer/deleter in
//! `reelhouse_db::tree`, each inside one transaction.

use axum::extract::{Multipart, State};
use reelhouse_core::error::CoreError;
use reelhouse_core::filter::{build_filter_pipeline, MediaCollection, MediaFilterParams};
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::commit_or_rollback;
use reelhouse_db::models::season::Season;
use reelhouse_db::models::show::{CreateShow, Show, ShowDeleteCounts, ShowTree, UpdateShow};
use reelhouse_db::repositories::{EpisodeRepo, SeasonRepo, ShowRepo};
use reelhouse_db::tree;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::{check_each, page_request, BulkIds};
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload;

/// `?fullDetails=true` nests seasons and episodes into each show.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailOptions {
    #[serde(default)]
    pub full_details: bool,
}

/// A show as returned by reads: flat, or with its seasons and episodes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShowView {
    Summary(Show),
    Full(ShowTree),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDeleted {
    pub deleted_count: ShowDeleteCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowsDeleted {
    pub delete_count: ShowDeleteCounts,
}

fn show_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::TvShow.label(), id))
}

async fn find_show(state: &AppState, id: DbId) -> AppResult<Show> {
    ShowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| show_not_found(id))
}

/// Load the seasons and episodes of `shows` and nest them.
async fn load_trees(state: &AppState, shows: Vec<Show>) -> AppResult<Vec<ShowTree>> {
    let show_ids: Vec<DbId> = shows.iter().map(|s| s.id).collect();
    let seasons = SeasonRepo::list_for_shows(&state.pool, &show_ids).await?;
    let season_ids: Vec<DbId> = seasons.iter().map(|s| s.id).collect();
    let episodes = EpisodeRepo::list_for_seasons(&state.pool, &season_ids).await?;
    Ok(ShowTree::assemble_many(shows, seasons, episodes))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/tv-show
///
/// Create a show with nested seasons and episodes, all or nothing.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateShow>,
) -> AppResult<Audited<ShowTree>> {
    input.check()?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_show_tree(&mut tx, &input).await;
    let show = commit_or_rollback(tx, result).await?;

    tracing::info!(
        show_id = show.show.id,
        seasons = show.seasons.len(),
        episodes = show.episode_count(),
        user_id = admin.user_id,
        "TV show created"
    );

    let audit = AuditContext::new(EntityKind::TvShow, &admin).after(&show);
    Ok(Audited::new(show, audit).with_message("TV show created"))
}

/// POST /api/v1/tv-show/bulk
///
/// Create several show trees in one transaction. The first failure aborts
/// the whole batch.
pub async fn create_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(inputs): AppJson<Vec<CreateShow>>,
) -> AppResult<Audited<Vec<ShowTree>>> {
    check_each(&inputs, CreateShow::check)?;

    let mut tx = state.pool.begin().await?;
    let result = tree::write_show_trees(&mut tx, &inputs).await;
    let shows = commit_or_rollback(tx, result).await?;

    tracing::info!(count = shows.len(), user_id = admin.user_id, "TV shows created");

    let audit = AuditContext::new(EntityKind::TvShow, &admin)
        .bulk()
        .after(&shows);
    Ok(Audited::new(shows, audit))
}

/// PUT /api/v1/tv-show/{id}
///
/// Update the show's own fields. Seasons and episodes are untouched.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateShow>,
) -> AppResult<Audited<Show>> {
    input.check()?;

    let before = find_show(&state, id).await?;
    let show = ShowRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| show_not_found(id))?;

    tracing::info!(show_id = id, user_id = admin.user_id, "TV show updated");
    let audit = AuditContext::new(EntityKind::TvShow, &admin)
        .before(&before)
        .after(&show);
    Ok(Audited::new(show, audit))
}

/// DELETE /api/v1/tv-show/{id}
///
/// Delete the show with all of its seasons and episodes.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<ShowDeleted>> {
    let before = ShowRepo::find_by_id(&state.pool, id).await?;

    let mut tx = state.pool.begin().await?;
    let result = tree::delete_show_tree(&mut tx, id).await;
    let counts = commit_or_rollback(tx, result).await?;

    tracing::info!(
        show_id = id,
        seasons = counts.seasons,
        episodes = counts.episodes,
        user_id = admin.user_id,
        "TV show deleted"
    );

    let audit = AuditContext::new(EntityKind::TvShow, &admin).before(&before);
    Ok(Audited::new(
        ShowDeleted {
            deleted_count: counts,
        },
        audit,
    )
    .with_message("TV show deleted"))
}

/// DELETE /api/v1/tv-show/bulk
///
/// Body: `{"ids": [..]}`. Any missing id aborts the batch with 404.
pub async fn delete_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<BulkIds>,
) -> AppResult<Audited<ShowsDeleted>> {
    let mut tx = state.pool.begin().await?;
    let result = tree::delete_show_trees(&mut tx, &input.ids).await;
    let counts = commit_or_rollback(tx, result).await?;

    tracing::info!(
        shows = counts.tv_show,
        seasons = counts.seasons,
        episodes = counts.episodes,
        user_id = admin.user_id,
        "TV shows deleted"
    );

    let audit = AuditContext::new(EntityKind::TvShow, &admin)
        .bulk()
        .before(&input.ids);
    Ok(Audited::new(
        ShowsDeleted {
            delete_count: counts,
        },
        audit,
    ))
}

/// POST /api/v1/tv-show/{id}/poster
pub async fn upload_poster(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<Audited<Show>> {
    let before = find_show(&state, id).await?;
    let image = upload::read_image(&mut multipart, state.config.upload_max_bytes).await?;
    let path = upload::store_image(&state.config.upload_dir, upload::POSTERS, &image).await?;

    let show = ShowRepo::set_poster(&state.pool, id, &path)
        .await?
        .ok_or_else(|| show_not_found(id))?;

    let audit = AuditContext::new(EntityKind::TvShow, &admin)
        .before(&before)
        .after(&show);
    Ok(Audited::new(show, audit).with_message("Poster updated"))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/tv-show
///
/// Filtered, paginated list. `fullDetails=true` nests seasons and episodes.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MediaFilterParams>,
    AppQuery(raw): AppQuery<RawPagination>,
    AppQuery(options): AppQuery<DetailOptions>,
) -> AppResult<ApiResponse<Page<ShowView>>> {
    let filter = params.validate_for(MediaCollection::Shows)?;
    let stages = build_filter_pipeline(&filter, page_request(&state, &raw));
    let page = ShowRepo::list(&state.pool, &stages).await?;

    if !options.full_details {
        return Ok(ApiResponse::ok(page.map(ShowView::Summary)));
    }

    let Page { items, pagination } = page;
    let trees = load_trees(&state, items).await?;
    Ok(ApiResponse::ok(Page {
        items: trees.into_iter().map(ShowView::Full).collect(),
        pagination,
    }))
}

/// GET /api/v1/tv-show/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(options): AppQuery<DetailOptions>,
) -> AppResult<ApiResponse<ShowView>> {
    let show = find_show(&state, id).await?;
    if !options.full_details {
        return Ok(ApiResponse::ok(ShowView::Summary(show)));
    }

    let tree = load_trees(&state, vec![show])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| show_not_found(id))?;
    Ok(ApiResponse::ok(ShowView::Full(tree)))
}

/// GET /api/v1/tv-show/{id}/seasons
pub async fn list_seasons(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<Season>>> {
    if !ShowRepo::exists(&state.pool, id).await? {
        return Err(show_not_found(id));
    }

    let page = page_request(&state, &raw);
    let seasons = SeasonRepo::list_for_show(&state.pool, id, page).await?;
    let total = SeasonRepo::count_for_show(&state.pool, id).await?;
    Ok(ApiResponse::ok(Page::new(seasons, total, page)))
}
