//! Integration tests for the `module_data` repository.
//!
//! Exercises upsert/find/delete against a real database:
//! - One row per (user, module)
//! - Wholesale replacement on save (no merge)
//! - Per-user isolation

use serde_json::json;
use sqlx::PgPool;
use studioos_db::repositories::ModuleDataRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    let row = ModuleDataRepo::find(&pool, 1, "dashboard").await.unwrap();
    assert!(row.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_creates_then_replaces_wholesale(pool: PgPool) {
    let first = ModuleDataRepo::upsert(&pool, 1, "dashboard", &json!({"theme": "dark", "goal": 3}))
        .await
        .unwrap();
    let second = ModuleDataRepo::upsert(&pool, 1, "dashboard", &json!({"theme": "light"}))
        .await
        .unwrap();

    // Same logical row.
    assert_eq!(first.id, second.id);

    let stored = ModuleDataRepo::find(&pool, 1, "dashboard")
        .await
        .unwrap()
        .expect("row should exist");
    // The previous `goal` field is gone: replaced, not merged.
    assert_eq!(stored.payload, json!({"theme": "light"}));
    assert!(stored.updated_at >= stored.created_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rows_are_isolated_per_user(pool: PgPool) {
    ModuleDataRepo::upsert(&pool, 1, "dashboard", &json!({"owner": 1}))
        .await
        .unwrap();
    ModuleDataRepo::upsert(&pool, 2, "dashboard", &json!({"owner": 2}))
        .await
        .unwrap();

    let one = ModuleDataRepo::find(&pool, 1, "dashboard").await.unwrap().unwrap();
    let two = ModuleDataRepo::find(&pool, 2, "dashboard").await.unwrap().unwrap();
    assert_eq!(one.payload["owner"], 1);
    assert_eq!(two.payload["owner"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_and_list_keys(pool: PgPool) {
    ModuleDataRepo::upsert(&pool, 7, "notes", &json!([])).await.unwrap();
    ModuleDataRepo::upsert(&pool, 7, "dashboard", &json!({})).await.unwrap();

    let keys = ModuleDataRepo::list_keys(&pool, 7).await.unwrap();
    assert_eq!(keys, vec!["dashboard", "notes"]);

    assert!(ModuleDataRepo::delete(&pool, 7, "notes").await.unwrap());
    assert!(!ModuleDataRepo::delete(&pool, 7, "notes").await.unwrap());
    assert_eq!(ModuleDataRepo::list_keys(&pool, 7).await.unwrap(), vec!["dashboard"]);
}
