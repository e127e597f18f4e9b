//! Viewer page and its client script.
//!
//! The page mounts a [`Viewer`] on the server against the in-process
//! collector, so one page load is one mount plus one fetch. Later fetches
//! go through `refresh`, which resumes the state the page carries.

use askama::Template;
use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::api::diagnostics::{request_facts, request_origin};
use crate::api::AppState;
use crate::collector::{self, CollectorContext, RequestFacts};
use crate::types::{ApiError, ApiResult};
use crate::viewer::render::{render, Report, StatusCard};
use crate::viewer::transport::{SnapshotTransport, TransportResponse};
use crate::viewer::{ClientDiagnosticState, ClientProbe, Viewer, ViewerError};

const VIEWER_SCRIPT: &str = include_str!("../../assets/viewer.js");

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    title: &'static str,
    cards: Vec<StatusCard>,
    report: String,
    state_json: String,
}

/// Calls the collector directly instead of going over the network
struct InProcessTransport {
    collector: Arc<CollectorContext>,
    facts: RequestFacts,
}

impl SnapshotTransport for InProcessTransport {
    fn endpoint(&self) -> String {
        self.facts.url.clone()
    }

    fn fetch(&self) -> impl Future<Output = Result<TransportResponse, ViewerError>> + Send {
        let collector = self.collector.clone();
        let facts = self.facts.clone();
        async move {
            let outcome = collector::collect(collector, facts).await;
            let body = serde_json::to_string(&outcome)
                .map_err(|e| ViewerError::Decode(e.to_string()))?;
            Ok(TransportResponse {
                status: outcome.status().as_u16(),
                body,
            })
        }
    }
}

/// GET / - Render the diagnostics viewer
pub async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if !state.config.diagnostics_enabled {
        return Err(ApiError::NotFound("diagnostics page is disabled".into()));
    }

    let (location, transport) = in_process(&state, &uri, &headers);
    let info = client_info(location, &uri, &headers);

    let mut viewer = Viewer::new(transport);
    viewer.mount(info).await;

    let report = render(viewer.state());
    let template = IndexTemplate {
        title: "Azure Deployment Diagnostics",
        cards: report.cards,
        report: report.text,
        state_json: embedded_json(viewer.state())?,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(err) => Err(ApiError::Internal(format!("Template error: {}", err))),
    }
}

#[derive(Serialize)]
pub struct RefreshReply {
    pub state: ClientDiagnosticState,
    pub report: Report,
}

/// POST /api/viewer/refresh - Fetch again on behalf of a mounted page
///
/// The page posts back the state it was rendered with; the reply carries
/// that state with the new fetch appended, plus its rendering.
pub async fn refresh(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Json(previous): Json<ClientDiagnosticState>,
) -> ApiResult<Json<RefreshReply>> {
    if !state.config.diagnostics_enabled {
        return Err(ApiError::NotFound("diagnostics page is disabled".into()));
    }

    let (_, transport) = in_process(&state, &uri, &headers);
    let mut viewer = Viewer::resume(transport, previous);
    viewer.fetch_server_diagnostics().await;

    Ok(Json(RefreshReply {
        report: render(viewer.state()),
        state: viewer.state().clone(),
    }))
}

/// Transport aimed at the snapshot endpoint, plus the URL the client is on
fn in_process(state: &AppState, uri: &Uri, headers: &HeaderMap) -> (String, InProcessTransport) {
    let mut facts = request_facts(uri, headers);
    let location = std::mem::replace(
        &mut facts.url,
        format!("{}/api/diagnostics", request_origin(headers)),
    );
    let transport = InProcessTransport {
        collector: state.collector.clone(),
        facts,
    };
    (location, transport)
}

/// What the requesting browser tells us about itself
fn client_info(location: String, uri: &Uri, headers: &HeaderMap) -> ClientProbe {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let accepts_html = header("accept").map_or(false, |v| v.contains("text/html"));

    ClientProbe {
        display_available: accepts_html,
        // Fetch-metadata names navigations; without it fall back to Accept
        document_available: match header("sec-fetch-dest") {
            Some(dest) => dest == "document",
            None => accepts_html,
        },
        network_available: uri.authority().is_some() || header("host").is_some(),
        location,
        user_agent: header("user-agent").unwrap_or("unknown").to_string(),
    }
}

/// JSON safe to inline in a `<script>` element
fn embedded_json(state: &ClientDiagnosticState) -> ApiResult<String> {
    serde_json::to_string(state)
        .map(|json| json.replace('<', "\\u003c"))
        .map_err(|e| ApiError::Internal(format!("State encoding error: {}", e)))
}

/// GET /assets/viewer.js - Client startup routine
pub async fn viewer_script() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        VIEWER_SCRIPT,
    )
}
