//! Superadmin gate for system-wide endpoints
//!
//! A parallel, simpler pipeline: authenticate, check the caller's global
//! role, and reject unless it is superadmin. No organization lookup, no
//! scope binding — these endpoints operate across all tenants at once, so
//! organization-scoped state is deliberately never touched.

use crate::error::TenantSecurityError;
use crate::middleware::identity::{identity_inputs, resolve_identity};
use crate::server::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Marker attached to requests that passed the superadmin gate
#[derive(Debug, Clone, Copy)]
pub struct SuperadminVerified;

pub async fn superadmin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (attached, token) = identity_inputs(&request);
    let identity = match resolve_identity(&state, attached, token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return TenantSecurityError::AuthRequired.into_response(),
        Err(e) => return e.into_response(),
    };

    if !identity.is_superadmin() {
        return TenantSecurityError::SuperadminRequired.into_response();
    }

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(SuperadminVerified);
    next.run(request).await
}
