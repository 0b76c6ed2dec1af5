//! Database initialization tests
//!
//! Covers first-run creation of the database file, idempotent schema setup,
//! and per-connection settings across the pool.

use adgen_common::db::{create_schema, init_database};
use adgen_common::db::init::BUSY_TIMEOUT;
use tempfile::TempDir;

async fn table_names(pool: &sqlx::SqlitePool) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_init_creates_database_and_tables() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("nested").join("adgen.db");

    let pool = init_database(&db_path).await.unwrap();

    assert!(db_path.exists(), "database file should be created");
    let tables = table_names(&pool).await;
    for expected in ["api_usage_logs", "audiences", "sessions"] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_schema_creation_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("adgen.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO audiences (id, user_id, name) VALUES ('a1', 'u1', 'Gamers')")
        .execute(&pool)
        .await
        .unwrap();

    create_schema(&pool).await.unwrap();
    drop(pool);

    // Reopen: existing rows survive
    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audiences")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_every_pooled_connection_gets_settings() {
    let temp = TempDir::new().unwrap();
    let pool = init_database(&temp.path().join("adgen.db")).await.unwrap();

    // Hold several connections at once so the pool has to open distinct ones
    let mut connections = Vec::new();
    for _ in 0..3 {
        connections.push(pool.acquire().await.unwrap());
    }

    for conn in connections.iter_mut() {
        let busy: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(busy, BUSY_TIMEOUT.as_millis() as i64);

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}
