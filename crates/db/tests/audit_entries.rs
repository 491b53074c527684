//! Integration tests for the history table: filtered queries and retention.

use chrono::{Duration, Utc};
use reelhouse_core::audit::{generate_title, ActionKind};
use reelhouse_core::media::EntityKind;
use reelhouse_core::pagination::PageRequest;
use reelhouse_db::models::audit::{AuditFilter, CreateAuditEntry};
use reelhouse_db::repositories::AuditRepo;
use sqlx::PgPool;

fn entry(user_id: i64, action: ActionKind, entity: EntityKind) -> CreateAuditEntry {
    CreateAuditEntry {
        user_id,
        action,
        entity_type: entity,
        entity_id: Some(1),
        old_value: None,
        new_value: Some(serde_json::json!({"id": 1})),
        title: generate_title(action, entity, false),
    }
}

const PAGE: PageRequest = PageRequest { limit: 20, start: 0 };

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_and_filter(pool: PgPool) {
    AuditRepo::insert(&pool, &entry(1, ActionKind::Add, EntityKind::Movie)).await.unwrap();
    AuditRepo::insert(&pool, &entry(1, ActionKind::Delete, EntityKind::TvShow)).await.unwrap();
    let mine = AuditRepo::insert(&pool, &entry(2, ActionKind::Add, EntityKind::Episode))
        .await
        .unwrap();

    assert_eq!(mine.title, "Added an new Episode");
    assert_eq!(mine.entity_type, "episode");
    assert_eq!(mine.action, "Add");

    let all = AuditFilter::default();
    assert_eq!(AuditRepo::count(&pool, &all).await.unwrap(), 3);

    let adds = AuditFilter {
        action: Some(ActionKind::Add),
        ..Default::default()
    };
    assert_eq!(AuditRepo::count(&pool, &adds).await.unwrap(), 2);

    let user_two = AuditFilter {
        user_id: Some(2),
        ..Default::default()
    };
    let rows = AuditRepo::query(&pool, &user_two, PAGE).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, mine.id);

    let shows = AuditFilter {
        entity_type: Some(EntityKind::TvShow),
        ..Default::default()
    };
    let rows = AuditRepo::query(&pool, &shows, PAGE).await.unwrap();
    assert_eq!(rows[0].title, "Deleted the TV Show");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_purge_removes_only_old_entries(pool: PgPool) {
    let old = AuditRepo::insert(&pool, &entry(1, ActionKind::Update, EntityKind::Game))
        .await
        .unwrap();
    AuditRepo::insert(&pool, &entry(1, ActionKind::Update, EntityKind::Game)).await.unwrap();

    sqlx::query("UPDATE audit_entries SET created_at = NOW() - INTERVAL '200 days' WHERE id = $1")
        .bind(old.id)
        .execute(&pool)
        .await
        .unwrap();

    let removed = AuditRepo::purge_older_than(&pool, Utc::now() - Duration::days(180))
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(AuditRepo::find_by_id(&pool, old.id).await.unwrap().is_none());
    assert_eq!(AuditRepo::count(&pool, &AuditFilter::default()).await.unwrap(), 1);
}
