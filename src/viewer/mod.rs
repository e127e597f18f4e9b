//! Snapshot viewer
//!
//! Drives the diagnostics endpoint and accumulates what the client saw:
//! - `mount`: probe the host once, then fetch
//! - `resume`: pick up a state a previous viewer left behind
//! - `fetch_server_diagnostics`: replace the stored snapshot (never merges)
//! - `clear_logs`: empty the log and raw server text without fetching
//!
//! Fetch failures never escape; they land in the error log and in
//! `server_data` so they show up in the rendered report.

pub mod render;
pub mod transport;

use serde::{Deserialize, Serialize};

use crate::types::iso_now;
use transport::SnapshotTransport;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// What the client could find out about its own host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProbe {
    /// A surface to render on (browser window, interactive terminal)
    pub display_available: bool,
    /// A document context (page navigation, working directory)
    pub document_available: bool,
    /// The client reached the server by a routable address
    pub network_available: bool,
    pub location: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDiagnosticState {
    pub client_info: Option<ClientProbe>,
    pub server_snapshot: Option<serde_json::Value>,
    pub server_data: String,
    pub logs: Vec<String>,
    pub errors: Vec<String>,
    pub loading: bool,
}

impl ClientDiagnosticState {
    fn log(&mut self, message: impl AsRef<str>) {
        self.logs.push(format!("[{}] {}", iso_now(), message.as_ref()));
    }
}

pub struct Viewer<T> {
    transport: T,
    state: ClientDiagnosticState,
}

impl<T: SnapshotTransport> Viewer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ClientDiagnosticState::default(),
        }
    }

    /// Continue from an earlier state; its log is kept and appended to.
    pub fn resume(transport: T, mut state: ClientDiagnosticState) -> Self {
        state.loading = false;
        Self { transport, state }
    }

    pub fn state(&self) -> &ClientDiagnosticState {
        &self.state
    }

    /// Record the host probe, then fetch the first snapshot.
    pub async fn mount(&mut self, probe: ClientProbe) {
        self.state.log("🚀 Client-side viewer mounted");
        self.state
            .log(format!("🖥️ Display available: {}", probe.display_available));
        self.state
            .log(format!("📄 Document available: {}", probe.document_available));
        self.state
            .log(format!("🧭 Network available: {}", probe.network_available));
        self.state.log(format!("📍 Location: {}", probe.location));
        self.state.log(format!("📱 User Agent: {}", probe.user_agent));
        self.state.client_info = Some(probe);

        self.fetch_server_diagnostics().await;
    }

    /// Fetch a fresh snapshot; `loading` is cleared on every path.
    pub async fn fetch_server_diagnostics(&mut self) {
        self.state.loading = true;
        self.state.log(format!(
            "🔄 Fetching server diagnostics from {}",
            self.transport.endpoint()
        ));

        let result = self.fetch_snapshot().await;
        match result {
            Ok((status, snapshot)) => {
                self.state.log(format!("📡 Server responded with status {}", status));
                self.state.server_data = serde_json::to_string_pretty(&snapshot)
                    .unwrap_or_else(|_| snapshot.to_string());
                self.state.server_snapshot = Some(snapshot);
                self.state.log("✅ Server diagnostics received");
            }
            Err(e) => {
                let message = format!("Failed to fetch server diagnostics: {}", e);
                tracing::warn!("{}", message);
                self.state.log(format!("❌ {}", message));
                self.state.errors.push(message.clone());
                self.state.server_snapshot = None;
                self.state.server_data = format!("ERROR: {}", message);
            }
        }

        self.state.loading = false;
    }

    async fn fetch_snapshot(&self) -> Result<(u16, serde_json::Value), ViewerError> {
        let response = self.transport.fetch().await?;
        if !response.is_success() {
            return Err(ViewerError::Http {
                status: response.status,
                body: response.body,
            });
        }
        let snapshot = serde_json::from_str(&response.body)
            .map_err(|e| ViewerError::Decode(e.to_string()))?;
        Ok((response.status, snapshot))
    }

    /// Empty the log and raw server text. Does not fetch.
    pub fn clear_logs(&mut self) {
        self.state.logs.clear();
        self.state.server_data.clear();
    }
}
