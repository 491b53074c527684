//! Poster and avatar uploads through the multipart endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_file_auth};
use sqlx::PgPool;

const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

#[sqlx::test(migrations = "../db/migrations")]
async fn test_poster_upload_stores_content_addressed_file(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;
    let config = common::test_config();
    let upload_dir = config.upload_dir.clone();

    let app = common::build_test_app_with(pool.clone(), config.clone());
    let movie = body_json(
        common::post_json_auth(app, "/api/v1/movies", &token, serde_json::json!({ "title": "Alien" }))
            .await,
    )
    .await;
    let id = movie["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with(pool, config);
    let response = post_file_auth(
        app,
        &format!("/api/v1/movies/{id}/poster"),
        &token,
        "poster.PNG",
        FAKE_PNG,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let path = json["data"]["posterPath"].as_str().unwrap().to_string();
    assert!(path.starts_with("posters/"));
    assert!(path.ends_with(".png"));

    let stored = tokio::fs::read(upload_dir.join(&path)).await.unwrap();
    assert_eq!(stored, FAKE_PNG);
    let _ = tokio::fs::remove_dir_all(upload_dir).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_poster_upload_rejects_unknown_extension(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;

    let app = common::build_test_app(pool.clone());
    let movie = body_json(
        common::post_json_auth(app, "/api/v1/movies", &token, serde_json::json!({ "title": "Alien" }))
            .await,
    )
    .await;
    let id = movie["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_file_auth(
        app,
        &format!("/api/v1/movies/{id}/poster"),
        &token,
        "poster.gif",
        b"GIF89a",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_oversized_upload_is_rejected(pool: PgPool) {
    let (_, token) = common::member(&pool, "bigface").await;
    let mut config = common::test_config();
    config.upload_max_bytes = 1024;

    let app = common::build_test_app_with(pool, config);
    let response = post_file_auth(
        app,
        "/api/v1/users/me/avatar",
        &token,
        "face.jpg",
        &vec![0u8; 4096],
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_avatar_upload_updates_profile(pool: PgPool) {
    let (user, token) = common::member(&pool, "selfie").await;
    let config = common::test_config();
    let upload_dir = config.upload_dir.clone();

    let app = common::build_test_app_with(pool, config);
    let response =
        post_file_auth(app, "/api/v1/users/me/avatar", &token, "me.webp", b"RIFF....WEBP").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert!(json["data"]["avatarPath"]
        .as_str()
        .unwrap()
        .starts_with("avatars/"));
    let _ = tokio::fs::remove_dir_all(upload_dir).await;
}
