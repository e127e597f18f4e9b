//! Azure Deployment Diagnostics
//!
//! HTTP server exposing a point-in-time host snapshot for debugging App
//! Service deployments. Debug-only: disable with `DIAGNOSTICS_ENABLED=false`.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use azure_diagnostics::api::{self, AppState};
use azure_diagnostics::collector::environment::ProcessEnv;
use azure_diagnostics::config::Config;
use azure_diagnostics::startup::StartupLogger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env(&ProcessEnv)?;

    let cwd = std::env::current_dir().ok();
    let startup = StartupLogger::bootstrap(&config, cwd.as_deref());
    startup.emit();

    if !config.diagnostics_enabled {
        tracing::warn!("Diagnostics disabled: /api/diagnostics and / will answer 404");
    }

    let addr = config.socket_addr();
    let app = api::app(AppState::new(config, Arc::new(ProcessEnv), startup));

    tracing::info!("Starting server on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                    - Diagnostics viewer page");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/diagnostics     - Host snapshot (JSON)");
    tracing::info!("  GET  /api/startup-check   - Startup log");
    tracing::info!("  POST /api/viewer/refresh  - Page refresh (viewer state in, state out)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
