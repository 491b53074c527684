//! Role guards.
//!
//! Putting the guard in the handler signature keeps the access rule next
//! to the code it protects: `RequireAdmin(admin): RequireAdmin` rejects
//! with 403 before the body is read.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use reelhouse_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Catalog writes, user management and the full history need `admin`.
pub struct RequireAdmin(pub AuthUser);

/// Any logged-in user: comments, profile edits, own history.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Admin route refused");
            Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(Self)
    }
}
