pub mod auth;
pub mod comments;
pub mod episodes;
pub mod games;
pub mod health;
pub mod history;
pub mod movies;
pub mod seasons;
pub mod shows;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth        register, login, current user
/// /users       admin user management, own profile and avatar
/// /tv-show     shows (nested create with seasons and episodes)
/// /seasons     seasons (nested create with episodes)
/// /episodes    episodes
/// /movies      movies
/// /games       games
/// /comments    comments on media items
/// /history     audit trail
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tv-show", shows::router())
        .nest("/seasons", seasons::router())
        .nest("/episodes", episodes::router())
        .nest("/movies", movies::router())
        .nest("/games", games::router())
        .nest("/comments", comments::router())
        .nest("/history", history::router())
}
