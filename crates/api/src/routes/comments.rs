use axum::routing::{get, put};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// GET    /        -> list (?kind=movie&id=42)
/// POST   /        -> create (requires auth)
/// PUT    /{id}    -> update (author only)
/// DELETE /{id}    -> delete (author or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(comments::list).post(comments::create))
        .route("/{id}", put(comments::update).delete(comments::delete))
}
