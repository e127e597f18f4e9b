//! System-level endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::AppState;
use crate::collector::process::SERVER_VERSION;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupCheckReport {
    pub server_version: &'static str,
    pub app_env: String,
    pub diagnostics_enabled: bool,
    pub entries: Vec<String>,
}

/// GET /health - Liveness probe
pub async fn health_check() -> &'static str {
    "ok"
}

/// GET /api/startup-check - Return the log recorded during bootstrap.
pub async fn get_startup_check(State(state): State<AppState>) -> Json<StartupCheckReport> {
    Json(StartupCheckReport {
        server_version: SERVER_VERSION,
        app_env: state.config.app_env.clone(),
        diagnostics_enabled: state.config.diagnostics_enabled,
        entries: state.startup.entries().to_vec(),
    })
}
