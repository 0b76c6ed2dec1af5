//! Audience ownership queries (audience store backing table)

use adgen_common::audience::Audience;
use adgen_common::Result;
use sqlx::SqlitePool;

/// True when `audience_id` exists and belongs to `user_id`
pub async fn is_audience_owner(db: &SqlitePool, audience_id: &str, user_id: &str) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM audiences WHERE id = ? AND user_id = ?")
            .bind(audience_id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;

    Ok(found.is_some())
}

/// Insert an audience record owned by `user_id`
pub async fn insert_audience(db: &SqlitePool, audience: &Audience, user_id: &str) -> Result<()> {
    let demographics = serde_json::to_string(&audience.demographics)
        .map_err(|e| adgen_common::Error::Internal(format!("Serialize demographics: {}", e)))?;

    sqlx::query("INSERT INTO audiences (id, user_id, name, demographics) VALUES (?, ?, ?, ?)")
        .bind(&audience.id)
        .bind(user_id)
        .bind(&audience.name)
        .bind(demographics)
        .execute(db)
        .await?;

    Ok(())
}
