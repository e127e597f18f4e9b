//! Diagnostic snapshot endpoint.

use axum::{
    extract::{OriginalUri, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;

use crate::api::AppState;
use crate::collector::{self, RequestFacts};
use crate::types::{ApiError, ApiResult};

/// GET /api/diagnostics - Collect a point-in-time snapshot of the host.
///
/// 200 with the snapshot, or 500 with the failure document. Debug-only: the
/// response includes host identifiers and error traces.
pub async fn get_diagnostics(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if !state.config.diagnostics_enabled {
        return Err(ApiError::NotFound("diagnostics endpoint is disabled".into()));
    }

    let facts = request_facts(&uri, &headers);
    tracing::debug!("Collecting diagnostics for {}", facts.url);

    let outcome = collector::collect(state.collector.clone(), facts).await;
    Ok((outcome.status(), Json(outcome)).into_response())
}

/// Headers as a name -> value map, repeated headers joined with ", "
pub fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

/// `scheme://host` the client addressed, honoring proxy headers
pub fn request_origin(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
    };
    let scheme = header("x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = header("x-forwarded-host")
        .or_else(|| header("host"))
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}://{}", scheme, host)
}

/// Absolute URL of the request as the client addressed it
pub fn request_url(uri: &axum::http::Uri, headers: &HeaderMap) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{}{}", request_origin(headers), path)
}

pub fn request_facts(uri: &axum::http::Uri, headers: &HeaderMap) -> RequestFacts {
    RequestFacts {
        url: request_url(uri, headers),
        headers: header_map(headers),
    }
}
