//! Organization context endpoints
//!
//! Read-only views over the bound context: what organization the caller is
//! acting on, with which role and capabilities. Useful for client UIs
//! deciding what to show, and for verifying the pipeline end to end.

use crate::domain::{permissions_for, Role};
use crate::middleware::OrgContext;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct CurrentOrganization {
    pub organization_id: String,
    pub user_id: String,
    pub role: Option<Role>,
    pub permissions: Vec<String>,
}

/// The caller's bound organization context
pub async fn current_organization(OrgContext(context): OrgContext) -> Json<CurrentOrganization> {
    let mut permissions: Vec<String> = context.permissions().iter().cloned().collect();
    permissions.sort();

    Json(CurrentOrganization {
        organization_id: context.organization_id().to_string(),
        user_id: context.user_id().to_string(),
        role: context.role(),
        permissions,
    })
}

#[derive(Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub priority: u8,
    pub permissions: Vec<&'static str>,
}

/// The role definitions available in an organization.
///
/// Routed behind the `manage:users` gate: reviewing what each role grants is
/// part of administering members.
pub async fn organization_roles(OrgContext(_context): OrgContext) -> Json<Vec<RoleDefinition>> {
    let roles = [
        Role::Owner,
        Role::Admin,
        Role::Manager,
        Role::Accountant,
        Role::OfficeStaff,
        Role::Member,
    ];

    Json(
        roles
            .into_iter()
            .map(|role| RoleDefinition {
                role,
                priority: role.priority(),
                permissions: permissions_for(role).to_vec(),
            })
            .collect(),
    )
}
