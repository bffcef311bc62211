//! System-wide endpoints, superadmin only

use crate::middleware::SuperadminVerified;
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SystemStatus {
    pub status: &'static str,
    pub scope: &'static str,
    pub version: &'static str,
}

/// Cross-tenant service status. Reachable only through the superadmin gate;
/// extracting the marker makes the dependency explicit.
pub async fn system_status(Extension(_verified): Extension<SuperadminVerified>) -> Json<SystemStatus> {
    Json(SystemStatus {
        status: "ok",
        scope: "global",
        version: env!("CARGO_PKG_VERSION"),
    })
}
