use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /            -> list (admin)
/// PUT    /me          -> update_me
/// POST   /me/avatar   -> upload_avatar
/// GET    /{id}        -> get_by_id (admin)
/// PUT    /{id}        -> update (admin)
/// DELETE /{id}        -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/me", put(users::update_me))
        .route("/me/avatar", post(users::upload_avatar))
        .route(
            "/{id}",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete),
        )
}
