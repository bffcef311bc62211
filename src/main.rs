use anyhow::Result;
use tenantguard::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize tracing
    telemetry::init(&config.telemetry);

    info!("Starting TenantGuard Service");
    info!("HTTP server listening on {}", config.http_addr());

    // Run the server
    server::run(config).await
}
