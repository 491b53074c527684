use axum::routing::{get, post};
use axum::Router;

use crate::handlers::episodes;
use crate::state::AppState;

/// Routes mounted at `/episodes`.
///
/// ```text
/// POST   /        -> create
/// POST   /bulk    -> create_bulk
/// DELETE /bulk    -> delete_bulk
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(episodes::create))
        .route(
            "/bulk",
            post(episodes::create_bulk).delete(episodes::delete_bulk),
        )
        .route(
            "/{id}",
            get(episodes::get_by_id)
                .put(episodes::update)
                .delete(episodes::delete),
        )
}
