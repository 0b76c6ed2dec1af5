//! API usage observer
//!
//! Usage recording is best-effort: it runs after the response body has been
//! built, and a failing (or panicking) recorder never changes the response.

use adgen_common::config::UsageSink;
use adgen_common::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use sqlx::SqlitePool;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompt_builder::PromptVariant;
use crate::db;

/// One completed generation or remix
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEvent {
    pub user_id: String,
    /// `concept_generation` or `concept_remix`
    pub operation: &'static str,
    /// Fallback concept was returned
    pub degraded: bool,
    pub occurred_at: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(user_id: impl Into<String>, variant: PromptVariant, degraded: bool) -> Self {
        Self {
            user_id: user_id.into(),
            operation: variant.operation(),
            degraded,
            occurred_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait UsageRecorder: Send + Sync {
    async fn record(&self, event: &UsageEvent) -> Result<()>;
}

/// Writes usage events to the log only
pub struct TracingUsageRecorder;

#[async_trait]
impl UsageRecorder for TracingUsageRecorder {
    async fn record(&self, event: &UsageEvent) -> Result<()> {
        info!(
            user_id = %event.user_id,
            operation = event.operation,
            degraded = event.degraded,
            at = %event.occurred_at.to_rfc3339(),
            "API usage"
        );
        Ok(())
    }
}

/// Persists usage events to `api_usage_logs`
pub struct SqliteUsageRecorder {
    db: SqlitePool,
}

impl SqliteUsageRecorder {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsageRecorder for SqliteUsageRecorder {
    async fn record(&self, event: &UsageEvent) -> Result<()> {
        db::insert_usage_log(&self.db, event).await
    }
}

/// Recorder for the configured sink
pub fn recorder_for(sink: UsageSink, db: SqlitePool) -> Arc<dyn UsageRecorder> {
    let recorder: Arc<dyn UsageRecorder> = match sink {
        UsageSink::Database => Arc::new(SqliteUsageRecorder::new(db)),
        UsageSink::Log => Arc::new(TracingUsageRecorder),
    };
    recorder
}

/// Record an event, logging and swallowing any failure
pub async fn record_usage(recorder: &dyn UsageRecorder, event: UsageEvent) {
    match AssertUnwindSafe(recorder.record(&event)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(
            user_id = %event.user_id,
            operation = event.operation,
            error = %e,
            "Failed to record API usage"
        ),
        Err(_) => warn!(
            user_id = %event.user_id,
            operation = event.operation,
            "Usage recorder panicked"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRecorder;

    #[async_trait]
    impl UsageRecorder for FailingRecorder {
        async fn record(&self, _event: &UsageEvent) -> Result<()> {
            Err(adgen_common::Error::Internal("disk full".into()))
        }
    }

    struct PanickingRecorder;

    #[async_trait]
    impl UsageRecorder for PanickingRecorder {
        async fn record(&self, _event: &UsageEvent) -> Result<()> {
            panic!("recorder bug");
        }
    }

    #[test]
    fn test_event_operation_names() {
        let event = UsageEvent::new("u1", PromptVariant::Generate, false);
        assert_eq!(event.operation, "concept_generation");
        let event = UsageEvent::new("u1", PromptVariant::Remix, true);
        assert_eq!(event.operation, "concept_remix");
        assert!(event.degraded);
    }

    #[tokio::test]
    async fn test_record_usage_swallows_errors_and_panics() {
        record_usage(&FailingRecorder, UsageEvent::new("u1", PromptVariant::Generate, false)).await;
        record_usage(&PanickingRecorder, UsageEvent::new("u1", PromptVariant::Remix, false)).await;
        record_usage(&TracingUsageRecorder, UsageEvent::new("u1", PromptVariant::Remix, false)).await;
    }

    #[tokio::test]
    async fn test_sqlite_recorder_persists() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        adgen_common::db::create_schema(&pool).await.unwrap();
        let recorder = SqliteUsageRecorder::new(pool.clone());

        recorder
            .record(&UsageEvent::new("u1", PromptVariant::Generate, true))
            .await
            .unwrap();

        assert_eq!(db::count_usage_logs(&pool, "u1").await.unwrap(), 1);
        assert_eq!(db::count_usage_logs(&pool, "u2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recorder_for_sink() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        adgen_common::db::create_schema(&pool).await.unwrap();

        let log_only = recorder_for(UsageSink::Log, pool.clone());
        log_only
            .record(&UsageEvent::new("u1", PromptVariant::Generate, false))
            .await
            .unwrap();
        assert_eq!(db::count_usage_logs(&pool, "u1").await.unwrap(), 0);

        let database = recorder_for(UsageSink::Database, pool.clone());
        database
            .record(&UsageEvent::new("u1", PromptVariant::Generate, false))
            .await
            .unwrap();
        assert_eq!(db::count_usage_logs(&pool, "u1").await.unwrap(), 1);
    }
}
