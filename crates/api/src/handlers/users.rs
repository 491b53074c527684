//! Handlers for the `/users` resource.
//!
//! Admins manage every account; any user edits their own profile and avatar
//! through `/users/me`.

use axum::extract::{Multipart, State};
use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::{Page, RawPagination};
use reelhouse_core::roles::is_valid_role;
use reelhouse_core::types::DbId;
use reelhouse_db::models::user::{UpdateUser, User, UserResponse};
use reelhouse_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::page_request;
use crate::middleware::audit::{AuditContext, Audited};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload;

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUser {
    #[validate(length(min = 3, max = 50, message = "must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Request body for `PUT /users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 3, max = 50, message = "must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))
}

async fn apply_update(state: &AppState, id: DbId, changes: &UpdateUser) -> AppResult<User> {
    UserRepo::update(&state.pool, id, changes)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(raw): AppQuery<RawPagination>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    let page = page_request(&state, &raw);
    let users = UserRepo::list(&state.pool, page).await?;
    let total = UserRepo::count(&state.pool).await?;
    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(ApiResponse::ok(Page::new(items, total, page)))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = find_user(&state, id).await?;
    Ok(ApiResponse::ok(UserResponse::from(user)))
}

/// PUT /api/v1/users/{id}
///
/// Change another account's username, email or role.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AdminUpdateUser>,
) -> AppResult<Audited<UserResponse>> {
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        if !is_valid_role(role) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "role: unknown role '{role}'"
            ))));
        }
    }

    let before = UserResponse::from(find_user(&state, id).await?);
    let changes = UpdateUser {
        username: input.username.map(|u| u.trim().to_string()),
        email: input.email.map(|e| e.trim().to_lowercase()),
        password_hash: None,
        role: input.role,
    };
    let user = UserResponse::from(apply_update(&state, id, &changes).await?);

    tracing::info!(user_id = id, admin_id = admin.user_id, "User updated");
    let audit = AuditContext::new(EntityKind::User, &admin)
        .before(&before)
        .after(&user);
    Ok(Audited::new(user, audit))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Audited<UserResponse>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Admins cannot delete their own account".into(),
        )));
    }

    let user = UserRepo::delete(&state.pool, id)
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
    let audit = AuditContext::new(EntityKind::User, &admin).before(&user);
    Ok(Audited::new(user, audit).with_message("User deleted"))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(input): AppJson<UpdateProfile>,
) -> AppResult<Audited<UserResponse>> {
    input.validate()?;

    let before = UserResponse::from(find_user(&state, user.user_id).await?);
    let password_hash = input
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let changes = UpdateUser {
        username: input.username.map(|u| u.trim().to_string()),
        email: input.email.map(|e| e.trim().to_lowercase()),
        password_hash,
        role: None,
    };
    let updated = UserResponse::from(apply_update(&state, user.user_id, &changes).await?);

    tracing::info!(user_id = user.user_id, "Profile updated");
    let audit = AuditContext::new(EntityKind::User, &user)
        .before(&before)
        .after(&updated);
    Ok(Audited::new(updated, audit))
}

/// POST /api/v1/users/me/avatar
///
/// Multipart upload with a `file` field (jpg, jpeg, png or webp).
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> AppResult<Audited<UserResponse>> {
    let image = upload::read_image(&mut multipart, state.config.upload_max_bytes).await?;
    let before = UserResponse::from(find_user(&state, user.user_id).await?);

    let path = upload::store_image(&state.config.upload_dir, upload::AVATARS, &image).await?;
    let updated = UserRepo::set_avatar(&state.pool, user.user_id, &path)
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user.user_id)))?;

    let audit = AuditContext::new(EntityKind::User, &user)
        .before(&before)
        .after(&updated);
    Ok(Audited::new(updated, audit).with_message("Avatar updated"))
}
