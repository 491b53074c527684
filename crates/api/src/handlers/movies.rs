//! Handlers for the `/movies` resource.

use axum::extract::{Multipart, State};
use reelhouse_core::error::CoreError;
use reelhouse_core::filter::{build_filter_pipeline, MediaCollection, MediaFilterParams};
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::error::TreeError;
use reelhouse_db::models::movie::{CreateMovie, Movie, UpdateMovie};
use reelhouse_db::repositories::MovieRepo;
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
pub struct MoviesDeleted {
    pub deleted_count: u64,
}

fn movie_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::Movie.label(), id))
}

async fn find_movie(state: &AppState, id: DbId) -> AppResult<Movie> {
    MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| movie_not_found(id))
}

/// GET /api/v1/movies
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MediaFilterParams>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<Movie>>> {
    let filter = params.validate_for(MediaCollection::Movies)?;
    let stages = build_filter_pipeline(&filter, page_request(&state, &raw));
    let page = MovieRepo::list(&state.pool, &stages).await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<Movie>> {
    Ok(ApiResponse::ok(find_movie(&state, id).await?))
}

/// POST /api/v1/movies
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateMovie>,
) -> AppResult<Audited<Movie>> {
    input.check()?;

    let movie = MovieRepo::insert(&state.pool, &input)
        .await
        .map_err(|source| TreeError::WriteFailed {
            entity: EntityKind::Movie,
            label: input.title.clone(),
            source,
        })?;

    tracing::info!(movie_id = movie.id, user_id = admin.user_id, "Movie created");
    let audit = AuditContext::new(EntityKind::Movie, &admin).after(&movie);
    Ok(Audited::new(movie, audit).with_message("Movie created"))
}

/// POST /api/v1/movies/bulk
pub async fn create_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(inputs): AppJson<Vec<CreateMovie>>,
) -> AppResult<Audited<Vec<Movie>>> {
    check_each(&inputs, CreateMovie::check)?;

    let mut tx = state.pool.begin().await?;
    let result = bulk::create_movies(&mut tx, &inputs).await;
    let movies = commit_or_rollback(tx, result).await?;

    tracing::info!(count = movies.len(), user_id = admin.user_id, "Movies created");
    let audit = AuditContext::new(EntityKind::Movie, &admin)
        .bulk()
        .after(&movies);
    Ok(Audited::new(movies, audit))
}

/// PUT /api/v1/movies/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateMovie>,
) -> AppResult<Audited<Movie>> {
    input.check()?;

    let before = find_movie(&state, id).await?;
    let movie = MovieRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    tracing::info!(movie_id = id, user_id = admin.user_id, "Movie updated");
    let audit = AuditContext::new(EntityKind::Movie, &admin)
        .before(&before)
        .after(&movie);
    Ok(Audited::new(movie, audit))
}

/// DELETE /api/v1/movies/{id}
///
/// Returns the deleted movie.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<Movie>> {
    let mut tx = state.pool.begin().await?;
    let result = bulk::delete_movie(&mut tx, id).await;
    let movie = commit_or_rollback(tx, result).await?;

    tracing::info!(movie_id = id, user_id = admin.user_id, "Movie deleted");
    let audit = AuditContext::new(EntityKind::Movie, &admin).before(&movie);
    Ok(Audited::new(movie, audit).with_message("Movie deleted"))
}

/// DELETE /api/v1/movies/bulk
pub async fn delete_bulk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<BulkIds>,
) -> AppResult<Audited<MoviesDeleted>> {
    let mut tx = state.pool.begin().await?;
    let result = bulk::delete_movies(&mut tx, &input.ids).await;
    let deleted = commit_or_rollback(tx, result).await?;

    tracing::info!(count = deleted, user_id = admin.user_id, "Movies deleted");
    let audit = AuditContext::new(EntityKind::Movie, &admin)
        .bulk()
        .before(&input.ids);
    Ok(Audited::new(
        MoviesDeleted {
            deleted_count: deleted,
        },
        audit,
    ))
}

/// POST /api/v1/movies/{id}/poster
pub async fn upload_poster(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<Audited<Movie>> {
    let before = find_movie(&state, id).await?;
    let image = upload::read_image(&mut multipart, state.config.upload_max_bytes).await?;
    let path = upload::store_image(&state.config.upload_dir, upload::POSTERS, &image).await?;

    let movie = MovieRepo::set_poster(&state.pool, id, &path)
        .await?
        .ok_or_else(|| movie_not_found(id))?;

    let audit = AuditContext::new(EntityKind::Movie, &admin)
        .before(&before)
        .after(&movie);
    Ok(Audited::new(movie, audit).with_message("Poster updated"))
}
