//! Roles, the role hierarchy, and the permission matrix
//!
//! Everything in this module is pure and side-effect-free: static data plus
//! deterministic lookups, trivially unit-testable in isolation from the
//! resolver and binder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Wildcard satisfying any read-class permission check
pub const READ_ALL: &str = "read:all";
/// Wildcard satisfying any write-class permission check
pub const WRITE_ALL: &str = "write:all";

pub const VIEW_CLIENTS: &str = "view:clients";
pub const VIEW_INVOICES: &str = "view:invoices";
pub const VIEW_REPORTS: &str = "view:reports";
pub const VIEW_MEMBERS: &str = "view:members";
pub const EXPORT_REPORTS: &str = "export:reports";
pub const MANAGE_USERS: &str = "manage:users";
pub const MANAGE_BILLING: &str = "manage:billing";
pub const MANAGE_SETTINGS: &str = "manage:settings";
pub const EDIT_CLIENTS: &str = "edit:clients";
pub const EDIT_INVOICES: &str = "edit:invoices";

/// Every capability token, wildcards included. This is the superadmin set.
const ALL_PERMISSIONS: &[&str] = &[
    READ_ALL,
    WRITE_ALL,
    VIEW_CLIENTS,
    VIEW_INVOICES,
    VIEW_REPORTS,
    VIEW_MEMBERS,
    EXPORT_REPORTS,
    MANAGE_USERS,
    MANAGE_BILLING,
    MANAGE_SETTINGS,
    EDIT_CLIENTS,
    EDIT_INVOICES,
];

/// Caller role.
///
/// Per-organization roles plus the global `superadmin` sentinel, which is not
/// tied to any membership row and bypasses per-organization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Manager,
    Accountant,
    OfficeStaff,
    Member,
    Superadmin,
}

impl Role {
    /// Parse a stored role string. Returns `None` for unrecognized roles so
    /// callers stay fail-closed instead of guessing.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "accountant" => Some(Role::Accountant),
            "office_staff" => Some(Role::OfficeStaff),
            "member" => Some(Role::Member),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Accountant => "accountant",
            Role::OfficeStaff => "office_staff",
            Role::Member => "member",
            Role::Superadmin => "superadmin",
        }
    }

    /// Privilege level used for "at least this role" checks. Strictly ordered;
    /// no two roles share a priority.
    pub fn priority(&self) -> u8 {
        match self {
            Role::Superadmin => 100,
            Role::Owner => 90,
            Role::Admin => 80,
            Role::Manager => 60,
            Role::Accountant => 50,
            Role::OfficeStaff => 40,
            Role::Member => 10,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/write class of a capability token.
///
/// A static, fixed property of each known token; never inferred at runtime.
/// Unknown tokens have no class, so the wildcards never satisfy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionClass {
    Read,
    Write,
}

/// Classify a capability token
pub fn classify(permission: &str) -> Option<PermissionClass> {
    match permission {
        VIEW_CLIENTS | VIEW_INVOICES | VIEW_REPORTS | VIEW_MEMBERS | EXPORT_REPORTS => {
            Some(PermissionClass::Read)
        }
        MANAGE_USERS | MANAGE_BILLING | MANAGE_SETTINGS | EDIT_CLIENTS | EDIT_INVOICES => {
            Some(PermissionClass::Write)
        }
        _ => None,
    }
}

/// Permission matrix: role -> capability set.
///
/// Exhaustive over [`Role`], so adding a role without deciding its
/// capabilities is a compile error.
pub fn permissions_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Superadmin | Role::Owner => ALL_PERMISSIONS,
        Role::Admin => &[
            VIEW_CLIENTS,
            VIEW_INVOICES,
            VIEW_REPORTS,
            VIEW_MEMBERS,
            EXPORT_REPORTS,
            EDIT_CLIENTS,
            EDIT_INVOICES,
            MANAGE_USERS,
            MANAGE_SETTINGS,
        ],
        Role::Manager => &[
            VIEW_CLIENTS,
            VIEW_INVOICES,
            VIEW_REPORTS,
            VIEW_MEMBERS,
            EDIT_CLIENTS,
            EDIT_INVOICES,
        ],
        Role::Accountant => &[
            VIEW_INVOICES,
            VIEW_REPORTS,
            EXPORT_REPORTS,
            EDIT_INVOICES,
            MANAGE_BILLING,
        ],
        Role::OfficeStaff => &[VIEW_CLIENTS, VIEW_INVOICES, VIEW_MEMBERS, EDIT_CLIENTS],
        Role::Member => &[VIEW_CLIENTS, VIEW_INVOICES],
    }
}

/// Exact or wildcard capability check against a materialized permission set
pub fn has_permission(permissions: &HashSet<String>, permission: &str) -> bool {
    if permissions.contains(permission) {
        return true;
    }
    match classify(permission) {
        Some(PermissionClass::Read) => permissions.contains(READ_ALL),
        Some(PermissionClass::Write) => permissions.contains(WRITE_ALL),
        None => false,
    }
}

/// "At least this role" check. `None` means the caller's role was not
/// recognized: priority 0, so any positive-priority requirement fails.
pub fn has_role_level(role: Option<Role>, required: Role) -> bool {
    role.map_or(0, |r| r.priority()) >= required.priority()
}
