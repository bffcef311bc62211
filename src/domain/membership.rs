//! Membership rows, authenticated identity, and the per-request
//! organization context

use super::role::{self, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Membership status
///
/// Anything other than `Active` denies access. Unrecognized stored values
/// decode to `Unknown` so a bad row fails closed instead of erroring out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Pending,
    Revoked,
    Removed,
    Unknown,
}

impl MembershipStatus {
    pub fn parse(s: &str) -> MembershipStatus {
        match s {
            "active" => MembershipStatus::Active,
            "pending" => MembershipStatus::Pending,
            "revoked" => MembershipStatus::Revoked,
            "removed" => MembershipStatus::Removed,
            _ => MembershipStatus::Unknown,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MembershipStatus::Active)
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Pending => "pending",
            MembershipStatus::Revoked => "revoked",
            MembershipStatus::Removed => "removed",
            MembershipStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for MembershipStatus {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        Ok(MembershipStatus::parse(&s))
    }
}

impl sqlx::Type<sqlx::MySql> for MembershipStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

/// A user's membership record in one organization.
///
/// The role is kept as the raw stored string; the resolver parses it and
/// grants nothing when it is unrecognized.
#[derive(Debug, Clone, FromRow)]
pub struct Membership {
    pub user_id: String,
    pub organization_id: String,
    pub role: String,
    pub status: MembershipStatus,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Authenticated caller, as produced by the identity collaborator
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    /// Global role, independent of any organization membership
    pub global_role: Option<Role>,
}

impl AuthenticatedUser {
    pub fn is_superadmin(&self) -> bool {
        self.global_role == Some(Role::Superadmin)
    }
}

/// Per-request organization context.
///
/// Created once per request by the resolver, immutable after construction,
/// owned by the request's execution scope. Permissions are materialized from
/// the permission matrix at construction time and never recomputed.
#[derive(Debug, Clone)]
pub struct OrganizationContext {
    organization_id: String,
    user_id: String,
    role: Option<Role>,
    permissions: HashSet<String>,
}

impl OrganizationContext {
    /// Build a context for the given role. `None` means the stored role was
    /// unrecognized: the permission set stays empty and every gate fails.
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        role: Option<Role>,
    ) -> Self {
        let permissions = role
            .map(|r| {
                role::permissions_for(r)
                    .iter()
                    .map(|p| p.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            role,
            permissions,
        }
    }

    /// Context for a global superadmin acting on an arbitrary organization
    pub fn superadmin(organization_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(organization_id, user_id, Some(Role::Superadmin))
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn permissions(&self) -> &HashSet<String> {
        &self.permissions
    }

    /// Exact or wildcard capability check
    pub fn has_permission(&self, permission: &str) -> bool {
        role::has_permission(&self.permissions, permission)
    }

    /// "At least this role" check
    pub fn has_role_level(&self, required: Role) -> bool {
        role::has_role_level(self.role, required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::{EDIT_INVOICES, MANAGE_USERS, VIEW_CLIENTS, VIEW_INVOICES};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_membership_status_parse() {
        assert_eq!(MembershipStatus::parse("active"), MembershipStatus::Active);
        assert_eq!(MembershipStatus::parse("pending"), MembershipStatus::Pending);
        assert_eq!(MembershipStatus::parse("revoked"), MembershipStatus::Revoked);
        assert_eq!(MembershipStatus::parse("removed"), MembershipStatus::Removed);
        assert_eq!(
            MembershipStatus::parse("suspended"),
            MembershipStatus::Unknown
        );
    }

    #[test]
    fn test_only_active_status_grants_access() {
        assert!(MembershipStatus::Active.is_active());
        for status in [
            MembershipStatus::Pending,
            MembershipStatus::Revoked,
            MembershipStatus::Removed,
            MembershipStatus::Unknown,
        ] {
            assert!(!status.is_active(), "{status} should not be active");
        }
    }

    #[test]
    fn test_context_materializes_permissions_at_construction() {
        let ctx = OrganizationContext::new("org-1", "user-1", Some(Role::Member));
        assert_eq!(ctx.organization_id(), "org-1");
        assert_eq!(ctx.user_id(), "user-1");
        assert_eq!(ctx.role(), Some(Role::Member));
        assert!(ctx.permissions().contains(VIEW_CLIENTS));
        assert!(ctx.permissions().contains(VIEW_INVOICES));
        assert!(!ctx.permissions().contains(MANAGE_USERS));
    }

    #[test]
    fn test_unrecognized_role_gets_empty_permissions() {
        let ctx = OrganizationContext::new("org-1", "user-1", None);
        assert_eq!(ctx.role(), None);
        assert!(ctx.permissions().is_empty());
        assert!(!ctx.has_permission(VIEW_CLIENTS));
        assert!(!ctx.has_role_level(Role::Member));
    }

    #[test]
    fn test_superadmin_context_has_full_permission_set() {
        let ctx = OrganizationContext::superadmin("any-org", "operator");
        assert_eq!(ctx.role(), Some(Role::Superadmin));
        assert!(ctx.has_permission(MANAGE_USERS));
        assert!(ctx.has_permission(EDIT_INVOICES));
        assert!(ctx.has_role_level(Role::Owner));
    }

    #[test]
    fn test_wildcards_flow_through_context_checks() {
        // Owner carries read:all/write:all, so class-level checks pass even
        // for tokens an explicit grant would miss.
        let ctx = OrganizationContext::new("org-1", "user-1", Some(Role::Owner));
        assert!(ctx.has_permission(MANAGE_USERS));
        assert!(ctx.has_permission(VIEW_CLIENTS));
        assert!(!ctx.has_permission("launch:rockets"));
    }

    #[test]
    fn test_authenticated_user_superadmin_check() {
        let operator = AuthenticatedUser {
            user_id: "op-1".to_string(),
            global_role: Some(Role::Superadmin),
        };
        let regular = AuthenticatedUser {
            user_id: "u-1".to_string(),
            global_role: None,
        };
        let admin = AuthenticatedUser {
            user_id: "u-2".to_string(),
            global_role: Some(Role::Admin),
        };
        assert!(operator.is_superadmin());
        assert!(!regular.is_superadmin());
        assert!(!admin.is_superadmin());
    }
}
