//! adgen-cg library - Concept Generation module
//!
//! Audience-targeted marketing concept generation over an OpenAI-compatible
//! chat completions API, behind an authenticated HTTP boundary.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod db;
pub mod error;
pub mod llm;
pub mod services;

use adgen_common::config::UsageSink;
use services::{
    recorder_for, AudienceOwnership, ConceptGenerator, IdentityProvider, SqliteAudienceOwnership,
    SqliteIdentityProvider, UsageRecorder,
};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Concept generation service
    pub generator: Arc<ConceptGenerator>,
    /// Session token → user id
    pub identity: Arc<dyn IdentityProvider>,
    /// Audience ownership check
    pub ownership: Arc<dyn AudienceOwnership>,
    /// Best-effort usage observer
    pub usage: Arc<dyn UsageRecorder>,
    /// Server start, for health uptime
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state from explicit collaborators
    pub fn new(
        generator: Arc<ConceptGenerator>,
        identity: Arc<dyn IdentityProvider>,
        ownership: Arc<dyn AudienceOwnership>,
        usage: Arc<dyn UsageRecorder>,
    ) -> Self {
        Self {
            generator,
            identity,
            ownership,
            usage,
            startup_time: Utc::now(),
        }
    }

    /// Create application state with identity and ownership backed by `db`
    /// and usage going to `sink`
    pub fn with_database(db: SqlitePool, generator: Arc<ConceptGenerator>, sink: UsageSink) -> Self {
        Self::new(
            generator,
            Arc::new(SqliteIdentityProvider::new(db.clone())),
            Arc::new(SqliteAudienceOwnership::new(db.clone())),
            recorder_for(sink, db),
        )
    }
}

/// Build application router
///
/// `/health` is public; the concept endpoints require a bearer session token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::post;
    use tower_http::trace::TraceLayer;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/generate-concept", post(api::generate_concept))
        .route("/api/remix-concept", post(api::remix_concept))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
