use axum::routing::{get, post};
use axum::Router;

use crate::handlers::games;
use crate::state::AppState;

/// Routes mounted at `/games`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// POST   /bulk           -> create_bulk
/// DELETE /bulk           -> delete_bulk
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// POST   /{id}/poster    -> upload_poster
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(games::list).post(games::create))
        .route(
            "/bulk",
            post(games::create_bulk).delete(games::delete_bulk),
        )
        .route(
            "/{id}",
            get(games::get_by_id)
                .put(games::update)
                .delete(games::delete),
        )
        .route("/{id}/poster", post(games::upload_poster))
}
