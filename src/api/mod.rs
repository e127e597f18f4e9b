//! HTTP surface of the diagnostics service

use axum::{
    http::{HeaderName, HeaderValue},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

mod diagnostics;
mod page;
mod system;

use crate::collector::environment::EnvSource;
use crate::collector::process::SERVER_VERSION;
use crate::collector::CollectorContext;
use crate::config::Config;
use crate::startup::StartupLogger;
use crate::types::iso_now;

/// Shared application state; immutable after bootstrap
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub collector: Arc<CollectorContext>,
    pub startup: Arc<StartupLogger>,
}

impl AppState {
    pub fn new(config: Config, env: Arc<dyn EnvSource>, startup: StartupLogger) -> Self {
        let collector = CollectorContext::new(env, config.root_dir.clone(), config.paths.clone());
        Self {
            config: Arc::new(config),
            collector: Arc::new(collector),
            startup: Arc::new(startup),
        }
    }
}

/// Create the API router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/diagnostics", get(diagnostics::get_diagnostics))
        .route("/startup-check", get(system::get_startup_check))
        .route("/viewer/refresh", post(page::refresh))
        .with_state(state)
}

/// Full application: page, assets, health, `/api`, and response layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/assets/viewer.js", get(page::viewer_script))
        .route("/health", get(system::health_check))
        .with_state(state.clone())
        .nest("/api", router(state))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-debug-timestamp"),
            |_: &Response| HeaderValue::from_str(&iso_now()).ok(),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-debug-server-version"),
            HeaderValue::from_static(SERVER_VERSION),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
