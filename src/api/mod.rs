//! HTTP API handlers

pub mod context;
pub mod health;
pub mod system;
