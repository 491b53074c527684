use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/history`.
///
/// ```text
/// GET /        -> list (admin)
/// GET /me      -> list_mine
/// GET /{id}    -> get_by_id (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(history::list))
        .route("/me", get(history::list_mine))
        .route("/{id}", get(history::get_by_id))
}
