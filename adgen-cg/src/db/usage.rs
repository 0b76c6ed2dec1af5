//! API usage log writes

use adgen_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::services::usage::UsageEvent;

/// Append one usage record
pub async fn insert_usage_log(db: &SqlitePool, event: &UsageEvent) -> Result<()> {
    sqlx::query(
        "INSERT INTO api_usage_logs (id, user_id, operation, degraded, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&event.user_id)
    .bind(event.operation)
    .bind(event.degraded)
    .bind(event.occurred_at)
    .execute(db)
    .await?;

    Ok(())
}

/// Number of usage records for a user
pub async fn count_usage_logs(db: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_usage_logs WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    Ok(count)
}
