use axum::routing::{get, post};
use axum::Router;

use crate::handlers::seasons;
use crate::state::AppState;

/// Routes mounted at `/seasons`.
///
/// ```text
/// POST   /                 -> create
/// POST   /bulk             -> create_bulk
/// DELETE /bulk             -> delete_bulk
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete (cascades to episodes)
/// GET    /{id}/episodes    -> list_episodes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(seasons::create))
        .route(
            "/bulk",
            post(seasons::create_bulk).delete(seasons::delete_bulk),
        )
        .route(
            "/{id}",
            get(seasons::get_by_id)
                .put(seasons::update)
                .delete(seasons::delete),
        )
        .route("/{id}/episodes", get(seasons::list_episodes))
}
