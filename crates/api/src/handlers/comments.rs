//! Handlers for the `/comments` resource.
//!
//! Comments attach to one media item through a `{kind, id}` reference.
//! Authors edit their own comments; authors and admins may delete them.

use axum::extract::State;
use reelhouse_core::error::CoreError;
use reelhouse_core::media::{EntityKind, MediaRef};
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::types::DbId;
use reelhouse_db::models::comment::{Comment, CreateComment, UpdateComment};
use reelhouse_db::repositories::CommentRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::page_request;
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for `GET /comments`: the commented item.
#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    pub kind: String,
    pub id: DbId,
}

impl TargetQuery {
    fn target(&self) -> Result<MediaRef, CoreError> {
        MediaRef::from_parts(&self.kind, self.id).ok_or_else(|| {
            CoreError::Validation(format!("kind: '{}' cannot carry comments", self.kind))
        })
    }
}

fn comment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(EntityKind::Comment.label(), id))
}

async fn find_comment(state: &AppState, id: DbId) -> AppResult<Comment> {
    CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| comment_not_found(id))
}

async fn ensure_target_exists(state: &AppState, target: MediaRef) -> AppResult<()> {
    if !CommentRepo::target_exists(&state.pool, target).await? {
        return Err(AppError::Core(CoreError::not_found(
            target.entity_kind().label(),
            target.id(),
        )));
    }
    Ok(())
}

/// GET /api/v1/comments?kind={kind}&id={id}
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TargetQuery>,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<Comment>>> {
    let target = query.target()?;
    let page = page_request(&state, &raw);
    let comments = CommentRepo::list_for_target(&state.pool, target, page).await?;
    let total = CommentRepo::count_for_target(&state.pool, target).await?;
    Ok(ApiResponse::ok(Page::new(comments, total, page)))
}

/// POST /api/v1/comments
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(input): AppJson<CreateComment>,
) -> AppResult<Audited<Comment>> {
    input.validate()?;
    ensure_target_exists(&state, input.target).await?;

    let comment = CommentRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        comment_id = comment.id,
        target_kind = %input.target.entity_kind(),
        target_id = input.target.id(),
        user_id = user.user_id,
        "Comment posted"
    );
    let audit = AuditContext::new(EntityKind::Comment, &user).after(&comment);
    Ok(Audited::new(comment, audit))
}

/// PUT /api/v1/comments/{id}
///
/// Only the author may edit.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateComment>,
) -> AppResult<Audited<Comment>> {
    input.validate()?;

    let before = find_comment(&state, id).await?;
    if before.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author can edit this comment".into(),
        )));
    }

    let comment = CommentRepo::update_body(&state.pool, id, &input.body)
        .await?
        .ok_or_else(|| comment_not_found(id))?;

    let audit = AuditContext::new(EntityKind::Comment, &user)
        .before(&before)
        .after(&comment);
    Ok(Audited::new(comment, audit))
}

/// DELETE /api/v1/comments/{id}
///
/// The author or an admin may delete.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<Comment>> {
    let comment = find_comment(&state, id).await?;
    if comment.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an admin can delete this comment".into(),
        )));
    }

    if !CommentRepo::delete(&state.pool, id).await? {
        return Err(comment_not_found(id));
    }

    tracing::info!(comment_id = id, user_id = user.user_id, "Comment deleted");
    let audit = AuditContext::new(EntityKind::Comment, &user).before(&comment);
    Ok(Audited::new(comment, audit).with_message("Comment deleted"))
}
