//! Telemetry initialization: tracing and structured logging

use crate::config::TelemetryConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to debug-level output for
/// this crate and tower-http. `log_format = "json"` switches to flattened
/// JSON events so `message` is consistently top-level.
pub fn init(config: &TelemetryConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenantguard=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        registry.with(fmt_layer).init();
    }
}
