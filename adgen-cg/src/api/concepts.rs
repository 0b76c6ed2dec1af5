//! Concept generation and remix endpoints
//!
//! Order of checks per request: authentication (middleware), body validation,
//! audience ownership, then exactly one call into the concept generator.
//! Generator degradation is not an error here; the fallback concept is
//! returned with 200.

use axum::{body::Bytes, extract::State, Extension, Json};
use adgen_common::audience::Audience;
use adgen_common::concept::GeneratedConcept;
use futures::FutureExt;
use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

use super::auth::AuthenticatedUser;
use super::validation::{parse_body, validate_generate, validate_remix};
use crate::error::{ApiError, ApiResult};
use crate::services::{record_usage, GenerationOutcome, UsageEvent};
use crate::AppState;

/// POST /api/generate-concept
pub async fn generate_concept(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    body: Bytes,
) -> ApiResult<Json<GeneratedConcept>> {
    let body = parse_body(&body).map_err(ApiError::Validation)?;
    let request = validate_generate(&body).map_err(ApiError::Validation)?;

    ensure_owned(&state, &user_id, request.audiences()).await?;

    info!(
        user_id = %user_id,
        audience_id = %request.audience.id,
        audience_count = request.additional_audiences.len() + 1,
        "Generating concept"
    );

    let outcome = guarded(state.generator.generate(&request)).await?;
    Ok(respond(&state, user_id, outcome))
}

/// POST /api/remix-concept
pub async fn remix_concept(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    body: Bytes,
) -> ApiResult<Json<GeneratedConcept>> {
    let body = parse_body(&body).map_err(ApiError::Validation)?;
    let request = validate_remix(&body).map_err(ApiError::Validation)?;

    ensure_owned(&state, &user_id, std::iter::once(&request.audience)).await?;

    info!(user_id = %user_id, audience_id = %request.audience.id, "Remixing concept");

    let outcome = guarded(state.generator.remix(&request)).await?;
    Ok(respond(&state, user_id, outcome))
}

/// Every referenced audience must belong to the caller
///
/// A lookup error is treated the same as "not owned" and the response never
/// says which audience failed or whether it exists.
async fn ensure_owned<'a>(
    state: &AppState,
    user_id: &str,
    audiences: impl Iterator<Item = &'a Audience>,
) -> ApiResult<()> {
    let mut checked = HashSet::new();
    for audience in audiences {
        if !checked.insert(audience.id.as_str()) {
            continue;
        }

        match state.ownership.is_owner(&audience.id, user_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user_id, audience_id = %audience.id, "Audience not owned by caller");
                return Err(ApiError::Forbidden);
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    audience_id = %audience.id,
                    error = %e,
                    "Ownership check failed"
                );
                return Err(ApiError::Forbidden);
            }
        }
    }
    Ok(())
}

/// Run a generator call, turning a panic into a 500
async fn guarded<F>(call: F) -> ApiResult<GenerationOutcome>
where
    F: Future<Output = GenerationOutcome>,
{
    AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .map_err(|_| ApiError::Internal("concept generator panicked".to_string()))
}

/// Build the response and hand the usage event to a background task
///
/// The recorder runs detached, so a slow or stuck observer never holds back
/// the response.
fn respond(state: &AppState, user_id: String, outcome: GenerationOutcome) -> Json<GeneratedConcept> {
    if outcome.degraded {
        warn!(user_id = %user_id, variant = %outcome.variant, "Returning fallback concept");
    }

    let event = UsageEvent::new(user_id, outcome.variant, outcome.degraded);
    let usage = Arc::clone(&state.usage);
    tokio::spawn(async move {
        record_usage(usage.as_ref(), event).await;
    });

    Json(outcome.concept)
}
