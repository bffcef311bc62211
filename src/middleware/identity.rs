//! Identity resolution
//!
//! The identity collaborator is external to this subsystem: a bearer token
//! maps to a user id and an optional global role via the session repository.
//! Resolution is a helper rather than its own rejecting layer so the tenant
//! pipeline can check the organization parameter first (a missing `orgId` is
//! answered before any authentication work).

use crate::domain::AuthenticatedUser;
use crate::error::Result;
use crate::server::AppState;
use axum::extract::Request;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract the Bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Pull the identity inputs out of a request as owned values.
///
/// Runs synchronously before any await: the request body is not `Sync`, so a
/// `&Request` must not be held across an await point in middleware futures.
pub fn identity_inputs(request: &Request) -> (Option<AuthenticatedUser>, Option<String>) {
    let attached = request.extensions().get::<AuthenticatedUser>().cloned();
    let token = extract_bearer_token(request.headers()).map(str::to_string);
    (attached, token)
}

/// Resolve the caller's identity for this request.
///
/// An `AuthenticatedUser` already attached to the request (by an upstream
/// auth layer or a test) wins; otherwise the bearer token is looked up in the
/// session store. `Ok(None)` means no valid session.
pub async fn resolve_identity(
    state: &AppState,
    attached: Option<AuthenticatedUser>,
    token: Option<String>,
) -> Result<Option<AuthenticatedUser>> {
    if let Some(identity) = attached {
        return Ok(Some(identity));
    }

    let Some(token) = token else {
        return Ok(None);
    };

    state.sessions.find_identity_by_token(&token).await
}
