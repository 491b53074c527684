#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use reelhouse_api::auth::jwt::{generate_access_token, JwtConfig};
use reelhouse_api::auth::password::hash_password;
use reelhouse_api::config::{ServerConfig, DEFAULT_UPLOAD_MAX_BYTES};
use reelhouse_api::router::build_app_router;
use reelhouse_api::state::AppState;
use reelhouse_core::pagination::PaginationLimits;
use reelhouse_core::roles::{ROLE_ADMIN, ROLE_USER};
use reelhouse_db::models::user::{CreateUser, User};
use reelhouse_db::repositories::UserRepo;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and a throwaway upload dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
        },
        pagination: PaginationLimits::default(),
        upload_dir: upload_dir(),
        upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        audit_retention_days: 30,
    }
}

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("reelhouse-test-{}", uuid::Uuid::new_v4()))
}

/// The production router and middleware stack over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

pub async fn create_user_with_role(pool: &PgPool, username: &str, role: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt).expect("token should sign")
}

/// Create an admin and return it with a bearer token.
pub async fn admin(pool: &PgPool) -> (User, String) {
    let user = create_user_with_role(pool, "admin", ROLE_ADMIN).await;
    let token = token_for(&user);
    (user, token)
}

/// Create a regular user and return it with a bearer token.
pub async fn member(pool: &PgPool, username: &str) -> (User, String) {
    let user = create_user_with_role(pool, username, ROLE_USER).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), Some(body)).await
}

/// POST a single-file multipart upload under the `file` field.
pub async fn post_file_auth(
    app: Router,
    uri: &str,
    token: &str,
    file_name: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "reelhouse-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Database probes
// ---------------------------------------------------------------------------

pub async fn table_count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// History rows are written by a detached task; poll until `expected`
/// rows exist or give up after two seconds.
pub async fn wait_for_history(pool: &PgPool, expected: i64) -> i64 {
    let mut count = 0;
    for _ in 0..40 {
        count = table_count(pool, "audit_entries").await;
        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    count
}

/// A show payload with `seasons` seasons of `episodes` episodes each.
pub fn show_payload(title: &str, seasons: i32, episodes: i32) -> serde_json::Value {
    let seasons: Vec<_> = (1..=seasons)
        .map(|s| {
            let episodes: Vec<_> = (1..=episodes)
                .map(|e| {
                    serde_json::json!({
                        "episodeNumber": e,
                        "title": format!("S{s}E{e}"),
                        "runTime": 45,
                    })
                })
                .collect();
            serde_json::json!({
                "seasonNumber": s,
                "title": format!("Season {s}"),
                "episodes": episodes,
            })
        })
        .collect();

    serde_json::json!({
        "title": title,
        "genres": ["Drama"],
        "languages": ["en"],
        "rating": 8.5,
        "seasons": seasons,
    })
}
