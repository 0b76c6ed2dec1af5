//! Session lookups (identity provider backing table)

use adgen_common::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Resolve a bearer token to its user id
///
/// Returns `None` for unknown or expired tokens. A NULL `expires_at` never
/// expires.
pub async fn find_session_user(db: &SqlitePool, token: &str) -> Result<Option<String>> {
    let user_id: Option<String> = sqlx::query_scalar(
        r#"
        SELECT user_id FROM sessions
        WHERE token = ?
          AND (expires_at IS NULL OR datetime(expires_at) > datetime('now'))
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(user_id)
}

/// Insert or replace a session
pub async fn insert_session(
    db: &SqlitePool,
    token: &str,
    user_id: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        adgen_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let pool = setup_test_db().await;
        assert_eq!(find_session_user(&pool, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_active_and_non_expiring_sessions() {
        let pool = setup_test_db().await;
        insert_session(&pool, "t1", "user-a", Some(Utc::now() + Duration::hours(1)))
            .await
            .unwrap();
        insert_session(&pool, "t2", "user-b", None).await.unwrap();

        assert_eq!(find_session_user(&pool, "t1").await.unwrap().as_deref(), Some("user-a"));
        assert_eq!(find_session_user(&pool, "t2").await.unwrap().as_deref(), Some("user-b"));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let pool = setup_test_db().await;
        insert_session(&pool, "old", "user-a", Some(Utc::now() - Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(find_session_user(&pool, "old").await.unwrap(), None);
    }
}
