//! HTTP middleware for TenantGuard
//!
//! - Identity resolution from bearer sessions
//! - The tenant authorization pipeline (resolve, bind, gate, release)
//! - The superadmin gate for system-wide endpoints

pub mod identity;
pub mod superadmin;
pub mod tenant;

pub use identity::{extract_bearer_token, identity_inputs, resolve_identity};
pub use superadmin::{superadmin_gate, SuperadminVerified};
pub use tenant::{
    optional_permission_gate, permission_gate, role_gate, tenant_scope, OptionalOrgContext,
    OrgContext,
};
