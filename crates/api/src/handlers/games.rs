//! Handlers for the `/games` resource.
//!
//! Games have no run time; the list filters reject `minRunTime`/`maxRunTime`.

use axum::extract::{Multipart, State};
use reelhouse_core::error::CoreError;
use reelhouse_core::filter::{build_filter_pipeline, MediaCollection, MediaFilterParams};
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::error::TreeError;
use reelhouse_db::models::game::{CreateGame, Game, UpdateGame};
use reelhouse_db::repositories::GameRepo;
use reelhouse_db::{bulk, commit_or_rollback};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::{check_each, page_request, BulkIds};
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesDeleted {
    pub deleted_count: u64,
}

fn game_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::Game.label(), id))
}

async fn find_game(state: &AppState, id: DbId) -> AppResult<Game> {
    GameRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| game_not_found(id))
}

/// GET /api/v1/games
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MediaFilterParams>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<Game>>> {
    let filter = params.validate_for(MediaCollection::Games)?;
    let stages = build_filter_pipeline(&filter, page_request(&state, &raw));
    let page = GameRepo::list(&state.pool, &stages).await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/games/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<Game>> {
    Ok(ApiResponse::ok(find_game(&state, id).await?))
}

/// POST /api/v1/games
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateGame>,
) -> AppResult<Audited<Game>> {
    input.check()?;

    let game = GameRepo::insert(&state.pool, &input)
        .await
        .map_err(|source| TreeError::WriteFailed {
            entity: EntityKind::Game,
            label: input.title.clone(),
            source,
        })?;

    tracing::info!(game_id = game.id, user_id = admin.user_id, "Game created");
    let audit = AuditContext::new(EntityKind::Game, &admin).after(&game);
    Ok(Audited::new(game, audit).with_message("Game created"))
}

/// POST /api/v1/games/bulk
pub async fn create_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(inputs): AppJson<Vec<CreateGame>>,
) -> AppResult<Audited<Vec<Game>>> {
    check_each(&inputs, CreateGame::check)?;

    let mut tx = state.pool.begin().await?;
    let result = bulk::create_games(&mut tx, &inputs).await;
    let games = commit_or_rollback(tx, result).await?;

    tracing::info!(count = games.len(), user_id = admin.user_id, "Games created");
    let audit = AuditContext::new(EntityKind::Game, &admin)
        .bulk()
        .after(&games);
    Ok(Audited::new(games, audit))
}

/// PUT /api/v1/games/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateGame>,
) -> AppResult<Audited<Game>> {
    input.check()?;

    let before = find_game(&state, id).await?;
    let game = GameRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| game_not_found(id))?;

    tracing::info!(game_id = id, user_id = admin.user_id, "Game updated");
    let audit = AuditContext::new(EntityKind::Game, &admin)
        .before(&before)
        .after(&game);
    Ok(Audited::new(game, audit))
}

/// DELETE /api/v1/games/{id}
///
/// Returns the deleted game.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<Game>> {
    let mut tx = state.pool.begin().await?;
    let result = bulk::delete_game(&mut tx, id).await;
    let game = commit_or_rollback(tx, result).await?;

    tracing::info!(game_id = id, user_id = admin.user_id, "Game deleted");
    let audit = AuditContext::new(EntityKind::Game, &admin).before(&game);
    Ok(Audited::new(game, audit).with_message("Game deleted"))
}

/// DELETE /api/v1/games/bulk
pub async fn delete_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<BulkIds>,
) -> AppResult<Audited<GamesDeleted>> {
    let mut tx = state.pool.begin().await?;
    let result = bulk::delete_games(&mut tx, &input.ids).await;
    let deleted = commit_or_rollback(tx, result).await?;

    tracing::info!(count = deleted, user_id = admin.user_id, "Games deleted");
    let audit = AuditContext::new(EntityKind::Game, &admin)
        .bulk()
        .before(&input.ids);
    Ok(Audited::new(
        GamesDeleted {
            deleted_count: deleted,
        },
        audit,
    ))
}

/// POST /api/v1/games/{id}/poster
pub async fn upload_poster(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<Audited<Game>> {
    let before = find_game(&state, id).await?;
    let image = upload::read_image(&mut multipart, state.config.upload_max_bytes).await?;
    let path = upload::store_image(&state.config.upload_dir, upload::POSTERS, &image).await?;

    let game = GameRepo::set_poster(&state.pool, id, &path)
        .await?
        .ok_or_else(|| game_not_found(id))?;

    let audit = AuditContext::new(EntityKind::Game, &admin)
        .before(&before)
        .after(&game);
    Ok(Audited::new(game, audit).with_message("Poster updated"))
}
