//! Identity and audience-ownership collaborators
//!
//! The request boundary depends on these traits only; the SQLite
//! implementations read the tables created at startup.

use adgen_common::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db;

/// Resolves a session token to the authenticated user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` for unknown or expired tokens
    async fn resolve_user(&self, token: &str) -> Result<Option<String>>;
}

/// Answers "does this user own this audience?"
#[async_trait]
pub trait AudienceOwnership: Send + Sync {
    async fn is_owner(&self, audience_id: &str, user_id: &str) -> Result<bool>;
}

/// Session table lookup
pub struct SqliteIdentityProvider {
    db: SqlitePool,
}

impl SqliteIdentityProvider {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for SqliteIdentityProvider {
    async fn resolve_user(&self, token: &str) -> Result<Option<String>> {
        db::find_session_user(&self.db, token).await
    }
}

/// Audience table lookup
pub struct SqliteAudienceOwnership {
    db: SqlitePool,
}

impl SqliteAudienceOwnership {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AudienceOwnership for SqliteAudienceOwnership {
    async fn is_owner(&self, audience_id: &str, user_id: &str) -> Result<bool> {
        db::is_audience_owner(&self.db, audience_id, user_id).await
    }
}
