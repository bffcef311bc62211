//! Unified error handling for TenantGuard
//!
//! Every failure in the authorization pipeline is a [`TenantSecurityError`]
//! carrying a stable machine-readable code and a transport status. Errors are
//! constructed at the failure site and propagated unmodified to the middleware
//! boundary, where they are rendered as `{error, code}` JSON. Unexpected
//! failures are logged with full detail server-side and surfaced as a generic
//! 500 with no internal detail.

use crate::domain::Role;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, TenantSecurityError>;

/// Tenant security error taxonomy
#[derive(Error, Debug)]
pub enum TenantSecurityError {
    #[error("organization id is missing or invalid")]
    MissingOrgId,

    #[error("authentication required")]
    AuthRequired,

    #[error("access denied to organization {0}")]
    AccessDenied(String),

    #[error("membership is not active")]
    AccessInactive,

    #[error("missing required permission: {0}")]
    InsufficientPermissions(String),

    #[error("role {0} or higher is required")]
    InsufficientRole(Role),

    #[error("superadmin access required")]
    SuperadminRequired,

    #[error("organization context missing")]
    ContextMissing,

    #[error("failed to bind tenant scope")]
    ContextSetFailed,

    #[error("access validation failed")]
    Storage(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl TenantSecurityError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            TenantSecurityError::MissingOrgId => "MISSING_ORG_ID",
            TenantSecurityError::AuthRequired => "AUTH_REQUIRED",
            TenantSecurityError::AccessDenied(_) => "ACCESS_DENIED",
            TenantSecurityError::AccessInactive => "ACCESS_INACTIVE",
            TenantSecurityError::InsufficientPermissions(_) => "INSUFFICIENT_PERMISSIONS",
            TenantSecurityError::InsufficientRole(_) => "INSUFFICIENT_ROLE",
            TenantSecurityError::SuperadminRequired => "SUPERADMIN_REQUIRED",
            TenantSecurityError::ContextMissing => "CONTEXT_MISSING",
            TenantSecurityError::ContextSetFailed => "CONTEXT_SET_FAILED",
            TenantSecurityError::Storage(_) => "VALIDATION_FAILED",
            TenantSecurityError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Transport-level status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            TenantSecurityError::MissingOrgId => StatusCode::BAD_REQUEST,
            TenantSecurityError::AuthRequired => StatusCode::UNAUTHORIZED,
            TenantSecurityError::AccessDenied(_)
            | TenantSecurityError::AccessInactive
            | TenantSecurityError::InsufficientPermissions(_)
            | TenantSecurityError::InsufficientRole(_)
            | TenantSecurityError::SuperadminRequired => StatusCode::FORBIDDEN,
            TenantSecurityError::ContextMissing
            | TenantSecurityError::ContextSetFailed
            | TenantSecurityError::Storage(_)
            | TenantSecurityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for TenantSecurityError {
    fn into_response(self) -> Response {
        let message = match &self {
            TenantSecurityError::Storage(e) => {
                tracing::error!("Storage error during access validation: {:?}", e);
                "access validation failed".to_string()
            }
            TenantSecurityError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: message,
            code: self.code(),
        });

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = TenantSecurityError::AccessDenied("org-1".to_string());
        assert_eq!(err.to_string(), "access denied to organization org-1");
    }

    #[test]
    fn test_error_codes_are_stable() {
        let cases: Vec<(TenantSecurityError, &str, StatusCode)> = vec![
            (
                TenantSecurityError::MissingOrgId,
                "MISSING_ORG_ID",
                StatusCode::BAD_REQUEST,
            ),
            (
                TenantSecurityError::AuthRequired,
                "AUTH_REQUIRED",
                StatusCode::UNAUTHORIZED,
            ),
            (
                TenantSecurityError::AccessDenied("o".into()),
                "ACCESS_DENIED",
                StatusCode::FORBIDDEN,
            ),
            (
                TenantSecurityError::AccessInactive,
                "ACCESS_INACTIVE",
                StatusCode::FORBIDDEN,
            ),
            (
                TenantSecurityError::InsufficientPermissions("manage:users".into()),
                "INSUFFICIENT_PERMISSIONS",
                StatusCode::FORBIDDEN,
            ),
            (
                TenantSecurityError::InsufficientRole(Role::Admin),
                "INSUFFICIENT_ROLE",
                StatusCode::FORBIDDEN,
            ),
            (
                TenantSecurityError::SuperadminRequired,
                "SUPERADMIN_REQUIRED",
                StatusCode::FORBIDDEN,
            ),
            (
                TenantSecurityError::ContextMissing,
                "CONTEXT_MISSING",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TenantSecurityError::ContextSetFailed,
                "CONTEXT_SET_FAILED",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_storage_error_is_validation_failed() {
        let err = TenantSecurityError::Storage(sqlx::Error::PoolClosed);
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_conversion() {
        let err: TenantSecurityError = anyhow::anyhow!("something went wrong").into();
        assert!(matches!(err, TenantSecurityError::Internal(_)));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_into_response_status() {
        let response = TenantSecurityError::SuperadminRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
