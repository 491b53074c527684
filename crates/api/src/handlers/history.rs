//! Handlers for the `/history` resource (read-only audit trail).

use axum::extract::State;
use reelhouse_core::error::CoreError;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::models::audit::{AuditEntry, AuditFilter, AuditQuery};
use reelhouse_db::repositories::AuditRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::handlers::page_request;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

async fn query_page(
    state: &AppState,
    filter: &AuditFilter,
    raw: &RawPagination,
) -> AppResult<Page<AuditEntry>> {
    let page = page_request(state, raw);
    let entries = AuditRepo::query(&state.pool, filter, page).await?;
    let total = AuditRepo::count(&state.pool, filter).await?;
    Ok(Page::new(entries, total, page))
}

/// GET /api/v1/history
///
/// Filters: `userId`, `entityType` (e.g. `tvShow`), `action` (e.g. `Delete`).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(query): AppQuery<AuditQuery>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<AuditEntry>>> {
    let filter = query.parse()?;
    Ok(ApiResponse::ok(query_page(&state, &filter, &raw).await?))
}

/// GET /api/v1/history/me
///
/// The caller's own entries. A `userId` filter is ignored.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppQuery(query): AppQuery<AuditQuery>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<AuditEntry>>> {
    let filter = AuditFilter {
        user_id: Some(user.user_id),
        ..query.parse()?
    };
    Ok(ApiResponse::ok(query_page(&state, &filter, &raw).await?))
}

/// GET /api/v1/history/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<AuditEntry>> {
    let entry = AuditRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("History entry", id)))?;
    Ok(ApiResponse::ok(entry))
}
