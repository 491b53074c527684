//! HTTP-level tests for registration, login and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, TEST_PASSWORD};
use sqlx::PgPool;

fn registration(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@Example.com"),
        "password": "long-enough-password",
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_creates_regular_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/register", registration("newbie")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Registration successful");
    assert_eq!(json["data"]["username"], "newbie");
    assert_eq!(json["data"]["email"], "newbie@example.com");
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"].get("passwordHash").is_none(), "hash must never leave the server");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_username_conflicts(pool: PgPool) {
    common::member(&pool, "taken").await;

    let app = common::build_test_app(pool);
    let mut body = registration("taken");
    body["email"] = serde_json::json!("other@example.com");
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = registration("shorty");
    body["password"] = serde_json::json!("abc");
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("password"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_returns_token_and_user(pool: PgPool) {
    let (user, _) = common::member(&pool, "viewer").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "viewer", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["accessToken"].is_string());
    assert_eq!(json["data"]["expiresIn"], 15 * 60);
    assert_eq!(json["data"]["user"]["id"], user.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_accepts_email(pool: PgPool) {
    common::member(&pool, "mailer").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "mailer@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password_is_unauthorized(pool: PgPool) {
    common::member(&pool, "viewer").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "viewer", "password": "not-the-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid username or password");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_returns_current_user(pool: PgPool) {
    let (user, token) = common::member(&pool, "viewer").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["username"], "viewer");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_regular_user_cannot_write_catalog(pool: PgPool) {
    let (_, token) = common::member(&pool, "viewer").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "title": "Heat" });
    let response = post_json_auth(app, "/api/v1/movies", &token, body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::table_count(&pool, "movies").await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_user_management(pool: PgPool) {
    let (admin, admin_token) = common::admin(&pool).await;
    let (member, _) = common::member(&pool, "promoted").await;

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/v1/users/{}", member.id),
        &admin_token,
        serde_json::json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/v1/users/{}", member.id),
        &admin_token,
        serde_json::json!({ "role": "superuser" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response =
        common::delete_auth(app, &format!("/api/v1/users/{}", admin.id), &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
