//! Tenant authorization pipeline
//!
//! Per request: extract the organization parameter, resolve the caller's
//! identity, resolve access into an [`OrganizationContext`], bind storage
//! scoping, hand the context to the handler, and release the scope on every
//! exit path. Permission and role gates compose on individual routes inside
//! the pipeline.

use crate::domain::{OrganizationContext, Role};
use crate::error::TenantSecurityError;
use crate::middleware::identity::{identity_inputs, resolve_identity};
use crate::scope::{ScopeBinder, ScopeReleaseGuard, TenantSession};
use crate::server::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Query parameter naming the organization a request acts on
pub const ORG_ID_PARAM: &str = "orgId";

fn org_id_from_query(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    for pair in query.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        if key == ORG_ID_PARAM {
            let decoded = urlencoding::decode(value).ok()?;
            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    }
    None
}

/// The authorization pipeline middleware.
///
/// Ordering contract: the `orgId` check answers before any authentication
/// work; bind happens before the handler sees the request; unbind runs after
/// the handler has fully returned, whatever the outcome.
pub async fn tenant_scope(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // Required organization parameter, checked first.
    let Some(org_id) = org_id_from_query(request.uri()) else {
        return TenantSecurityError::MissingOrgId.into_response();
    };

    let span = tracing::info_span!(
        "tenant_scope",
        request_id = %Uuid::new_v4(),
        organization_id = %org_id,
    );
    scoped_pipeline(state, org_id, request, next).instrument(span).await
}

async fn scoped_pipeline(
    state: AppState,
    org_id: String,
    mut request: Request,
    next: Next,
) -> Response {
    // Authenticated identity.
    let (attached, token) = identity_inputs(&request);
    let identity = match resolve_identity(&state, attached, token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return TenantSecurityError::AuthRequired.into_response(),
        Err(e) => return e.into_response(),
    };

    // Resolve access and materialize the context.
    let context = match state.resolver.resolve_access(&identity, &org_id).await {
        Ok(context) => Arc::new(context),
        Err(e) => return e.into_response(),
    };

    // Bind storage scoping for this unit of work. No tenant-scoped query may
    // run if this fails.
    let session = state.scope_factory.session();
    let binder = Arc::new(ScopeBinder::new(session.clone()));
    if let Err(e) = binder.bind(&context).await {
        return e.into_response();
    }
    let guard = ScopeReleaseGuard::new(binder);

    // Handoff to gates and handlers: the context for checks, the session so
    // downstream queries run on the scoped connection.
    request.extensions_mut().insert(context);
    request.extensions_mut().insert(TenantSession(session));

    let response = next.run(request).await;

    // Release on every exit path. Gate rejections and handler errors come
    // back through `next`, so they pass here too; the guard's Drop covers
    // panic and cancellation.
    guard.release().await;

    response
}

/// Reject with `INSUFFICIENT_PERMISSIONS` unless the bound context holds the
/// capability (exactly or via wildcard)
pub async fn permission_gate(permission: &'static str, request: Request, next: Next) -> Response {
    let Some(context) = request.extensions().get::<Arc<OrganizationContext>>() else {
        return TenantSecurityError::ContextMissing.into_response();
    };
    if !context.has_permission(permission) {
        return TenantSecurityError::InsufficientPermissions(permission.to_string())
            .into_response();
    }
    next.run(request).await
}

/// Reject with `INSUFFICIENT_ROLE` unless the bound context's role is at
/// least `required`
pub async fn role_gate(required: Role, request: Request, next: Next) -> Response {
    let Some(context) = request.extensions().get::<Arc<OrganizationContext>>() else {
        return TenantSecurityError::ContextMissing.into_response();
    };
    if !context.has_role_level(required) {
        return TenantSecurityError::InsufficientRole(required).into_response();
    }
    next.run(request).await
}

/// Like [`permission_gate`], but lets the request through unchanged when no
/// context was attached at all (routes that may operate globally)
pub async fn optional_permission_gate(
    permission: &'static str,
    request: Request,
    next: Next,
) -> Response {
    match request.extensions().get::<Arc<OrganizationContext>>() {
        None => next.run(request).await,
        Some(context) if context.has_permission(permission) => next.run(request).await,
        Some(_) => {
            TenantSecurityError::InsufficientPermissions(permission.to_string()).into_response()
        }
    }
}

/// Extractor handing handlers the bound organization context.
///
/// Fails with `CONTEXT_MISSING` (500) when used outside the pipeline: that is
/// a wiring bug, not a client error.
pub struct OrgContext(pub Arc<OrganizationContext>);

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = TenantSecurityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<OrganizationContext>>()
            .cloned()
            .map(OrgContext)
            .ok_or(TenantSecurityError::ContextMissing)
    }
}

/// Optional variant returning `None` instead of failing
pub struct OptionalOrgContext(pub Option<Arc<OrganizationContext>>);

impl<S> FromRequestParts<S> for OptionalOrgContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalOrgContext(
            parts.extensions.get::<Arc<OrganizationContext>>().cloned(),
        ))
    }
}
