use axum::routing::{get, post};
use axum::Router;

use crate::handlers::shows;
use crate::state::AppState;

/// Routes mounted at `/tv-show`.
///
/// ```text
/// GET    /                -> list (?fullDetails=true embeds seasons and episodes)
/// POST   /                -> create
/// POST   /bulk            -> create_bulk
/// DELETE /bulk            -> delete_bulk
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete (cascades to seasons and episodes)
/// POST   /{id}/poster     -> upload_poster
/// GET    /{id}/seasons    -> list_seasons
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shows::list).post(shows::create))
        .route(
            "/bulk",
            post(shows::create_bulk).delete(shows::delete_bulk),
        )
        .route(
            "/{id}",
            get(shows::get_by_id)
                .put(shows::update)
                .delete(shows::delete),
        )
        .route("/{id}/poster", post(shows::upload_poster))
        .route("/{id}/seasons", get(shows::list_seasons))
}
