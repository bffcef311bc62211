//! TenantGuard - Multi-tenant authorization and row scoping
//!
//! This crate resolves which organization and role a caller is acting as,
//! computes the effective permission set, binds that scope into the storage
//! session so every query is restricted to the caller's organization, and
//! guarantees the scope is released on every exit path.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod resolver;
pub mod scope;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TenantSecurityError};
