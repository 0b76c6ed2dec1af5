//! Bearer-token authentication middleware
//!
//! Runs before the body is read, so an unauthenticated request is rejected
//! with 401 regardless of what it contains. On success the resolved user id
//! is attached to the request as an [`AuthenticatedUser`] extension.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::error::ApiError;
use crate::AppState;

/// User id resolved from the session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Extract `<token>` from `Authorization: Bearer <token>`
fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware
///
/// Applied to the concept routes only; `/health` stays public.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&request).map(str::to_owned) else {
        debug!("Request without bearer token rejected");
        return Err(ApiError::Unauthorized);
    };

    let user_id = match state.identity.resolve_user(&token).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            debug!("Unknown or expired session token");
            return Err(ApiError::Unauthorized);
        }
        Err(e) => {
            // Fail closed: an unreachable identity store is not a session
            error!(error = %e, "Session lookup failed");
            return Err(ApiError::Unauthorized);
        }
    };

    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/generate-concept");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&request_with(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&request_with(Some("bearer  abc123 "))), Some("abc123"));
        assert_eq!(bearer_token(&request_with(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&request_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with(Some("abc123"))), None);
        assert_eq!(bearer_token(&request_with(None)), None);
    }
}
