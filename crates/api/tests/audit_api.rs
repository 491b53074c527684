//! History recording through the HTTP stack.
//!
//! Entries are written by a detached task after the response is built, so
//! these tests poll the table before asserting.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth, wait_for_history,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_records_add_entry(pool: PgPool) {
    let (admin, token) = common::admin(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/movies",
        &token,
        serde_json::json!({ "title": "Heat", "runTime": 170 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let movie_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    assert_eq!(wait_for_history(&pool, 1).await, 1);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/history", &token).await).await;
    let entry = &json["data"]["items"][0];
    assert_eq!(entry["userId"], admin.id);
    assert_eq!(entry["action"], "Add");
    assert_eq!(entry["entityType"], "movie");
    assert_eq!(entry["entityId"], movie_id);
    assert_eq!(entry["title"], "Added a new Movie");
    assert!(entry["oldValue"].is_null());
    assert_eq!(entry["newValue"]["title"], "Heat");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_records_both_snapshots(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;

    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json_auth(app, "/api/v1/games", &token, serde_json::json!({ "title": "Doom" })).await,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/games/{id}"),
        &token,
        serde_json::json!({ "title": "Doom Eternal" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(wait_for_history(&pool, 2).await, 2);

    let app = common::build_test_app(pool);
    let json = body_json(
        get_auth(app, "/api/v1/history?action=Update&entityType=game", &token).await,
    )
    .await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Updated the Game");
    assert_eq!(items[0]["oldValue"]["title"], "Doom");
    assert_eq!(items[0]["newValue"]["title"], "Doom Eternal");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bulk_delete_title_is_plural(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;

    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json_auth(
            app,
            "/api/v1/movies/bulk",
            &token,
            serde_json::json!([{ "title": "A" }, { "title": "B" }]),
        )
        .await,
    )
    .await;
    let ids: Vec<i64> = created["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();

    let app = common::build_test_app(pool.clone());
    let response = common::delete_json_auth(
        app,
        "/api/v1/movies/bulk",
        &token,
        serde_json::json!({ "ids": ids }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deletedCount"], 2);
    assert_eq!(wait_for_history(&pool, 2).await, 2);

    let app = common::build_test_app(pool);
    let json =
        body_json(get_auth(app, "/api/v1/history?action=Delete", &token).await).await;
    let entry = &json["data"]["items"][0];
    assert_eq!(entry["title"], "Deleted the Movies");
    assert!(entry["entityId"].is_null());
    assert_eq!(entry["oldValue"], serde_json::json!(ids));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_update_redacts_password_hash(pool: PgPool) {
    let (_, token) = common::member(&pool, "changer").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/users/me",
        &token,
        serde_json::json!({ "password": "a-brand-new-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(wait_for_history(&pool, 1).await, 1);

    let stored: serde_json::Value =
        sqlx::query_scalar("SELECT new_value FROM audit_entries LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    let text = stored.to_string();
    assert!(!text.contains("argon2"), "password hashes must never be stored in history");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_and_anonymous_requests_are_not_recorded(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/movies/31337", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "quiet",
            "email": "quiet@example.com",
            "password": "long-enough-password",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(common::table_count(&pool, "audit_entries").await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_history_access_control(pool: PgPool) {
    let (_, admin_token) = common::admin(&pool).await;
    let (member, member_token) = common::member(&pool, "commenter").await;

    let app = common::build_test_app(pool.clone());
    let movie = body_json(
        post_json_auth(app, "/api/v1/movies", &admin_token, serde_json::json!({ "title": "Ran" }))
            .await,
    )
    .await;
    let movie_id = movie["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/comments",
        &member_token,
        serde_json::json!({ "target": { "kind": "movie", "id": movie_id }, "body": "Epic." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(wait_for_history(&pool, 2).await, 2);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/history", &member_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/history/me", &member_token).await).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["userId"], member.id);
    assert_eq!(items[0]["entityType"], "comment");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_history_write_failure_does_not_fail_request(pool: PgPool) {
    let (_, token) = common::admin(&pool).await;
    sqlx::query("DROP TABLE audit_entries").execute(&pool).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/movies",
        &token,
        serde_json::json!({ "title": "Heat" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["title"], "Heat");
    assert_eq!(common::table_count(&pool, "movies").await, 1);

    // The detached writer fails; later requests still go through.
    let app = common::build_test_app(pool.clone());
    let id = json["data"]["id"].as_i64().unwrap();
    let response = delete_auth(app, &format!("/api/v1/movies/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::table_count(&pool, "movies").await, 0);
}
