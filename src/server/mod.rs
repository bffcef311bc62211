//! HTTP server setup and routing
//!
//! Wires the authorization pipeline around the API surface: `/health` is
//! public, everything under `/api` runs through the tenant pipeline, and
//! `/system` sits behind the superadmin gate.

use crate::api;
use crate::config::Config;
use crate::domain::role::MANAGE_USERS;
use crate::middleware::{permission_gate, superadmin_gate, tenant_scope};
use crate::repository::membership::MembershipRepositoryImpl;
use crate::repository::session::SessionRepositoryImpl;
use crate::repository::SessionRepository;
use crate::resolver::TenantAccessResolver;
use crate::scope::{MySqlScopeFactory, ScopeStoreFactory};
use anyhow::Context;
use axum::{middleware, routing::get, Router};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionRepository>,
    pub resolver: Arc<TenantAccessResolver>,
    pub scope_factory: Arc<dyn ScopeStoreFactory>,
}

impl AppState {
    pub fn new(config: Config, pool: MySqlPool) -> Self {
        let memberships = Arc::new(MembershipRepositoryImpl::new(pool.clone()));
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionRepositoryImpl::new(pool.clone())),
            resolver: Arc::new(TenantAccessResolver::new(memberships)),
            scope_factory: Arc::new(MySqlScopeFactory::new(pool)),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/context", get(api::context::current_organization))
        .route(
            "/roles",
            get(api::context::organization_roles).layer(middleware::from_fn(|request, next| {
                permission_gate(MANAGE_USERS, request, next)
            })),
        )
        .layer(middleware::from_fn_with_state(state.clone(), tenant_scope));

    let system_routes = Router::new()
        .route("/status", get(api::system::system_status))
        .layer(middleware::from_fn_with_state(state, superadmin_gate));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .nest("/api", tenant_routes)
        .nest("/system", system_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the HTTP server until shutdown
pub async fn run(config: Config) -> anyhow::Result<()> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let addr = config.http_addr();
    let state = AppState::new(config, pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("TenantGuard listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{DatabaseConfig, TelemetryConfig};
    use crate::repository::membership::MockMembershipRepository;
    use crate::repository::session::MockSessionRepository;
    use crate::scope::test_support::SharedSessionFactory;

    pub fn test_config() -> Config {
        Config {
            http_host: "127.0.0.1".to_string(),
            http_port: 8080,
            database: DatabaseConfig {
                url: "mysql://localhost/tenantguard_test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            telemetry: TelemetryConfig {
                log_format: "text".to_string(),
            },
        }
    }

    pub fn state_with(
        sessions: MockSessionRepository,
        memberships: MockMembershipRepository,
        scope_factory: Arc<dyn ScopeStoreFactory>,
    ) -> AppState {
        AppState {
            config: Arc::new(test_config()),
            sessions: Arc::new(sessions),
            resolver: Arc::new(TenantAccessResolver::new(Arc::new(memberships))),
            scope_factory,
        }
    }

    pub fn state_with_sessions(sessions: MockSessionRepository) -> AppState {
        state_with(
            sessions,
            MockMembershipRepository::new(),
            Arc::new(SharedSessionFactory::new()),
        )
    }
}
