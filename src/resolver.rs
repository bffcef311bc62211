//! Tenant access resolution
//!
//! Given an authenticated caller and a requested organization, decides
//! whether access is allowed and produces the request's
//! [`OrganizationContext`]. Read-only and idempotent: safe to retry.

use crate::domain::{AuthenticatedUser, OrganizationContext, Role};
use crate::error::{Result, TenantSecurityError};
use crate::repository::MembershipRepository;
use std::sync::Arc;
use tracing::warn;

lazy_static::lazy_static! {
    /// Caller-supplied identifier, so the syntax is checked before any lookup
    static ref ORG_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").unwrap();
}

pub struct TenantAccessResolver {
    memberships: Arc<dyn MembershipRepository>,
}

impl TenantAccessResolver {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    /// Resolve the caller's access to an organization.
    ///
    /// A global superadmin receives a context for any organization without a
    /// membership lookup; everyone else needs an active membership there.
    /// Unrecognized membership roles produce an empty permission set.
    pub async fn resolve_access(
        &self,
        identity: &AuthenticatedUser,
        organization_id: &str,
    ) -> Result<OrganizationContext> {
        if identity.user_id.is_empty() {
            return Err(TenantSecurityError::AuthRequired);
        }
        if !ORG_ID_REGEX.is_match(organization_id) {
            return Err(TenantSecurityError::MissingOrgId);
        }

        // Global override: a system operator can act on any tenant.
        if identity.is_superadmin() {
            return Ok(OrganizationContext::superadmin(
                organization_id,
                &identity.user_id,
            ));
        }

        let membership = self
            .memberships
            .find_membership(&identity.user_id, organization_id)
            .await?
            .ok_or_else(|| TenantSecurityError::AccessDenied(organization_id.to_string()))?;

        if !membership.status.is_active() {
            return Err(TenantSecurityError::AccessInactive);
        }

        let role = Role::parse(&membership.role);
        if role.is_none() {
            warn!(
                user_id = %identity.user_id,
                organization_id,
                role = %membership.role,
                "unrecognized membership role, granting no permissions"
            );
        }

        Ok(OrganizationContext::new(
            organization_id,
            &identity.user_id,
            role,
        ))
    }
}
