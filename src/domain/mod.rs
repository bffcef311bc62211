//! Domain models for tenant security

pub mod membership;
pub mod role;

pub use membership::{AuthenticatedUser, Membership, MembershipStatus, OrganizationContext};
pub use role::{
    classify, has_permission, has_role_level, permissions_for, PermissionClass, Role, READ_ALL,
    WRITE_ALL,
};
