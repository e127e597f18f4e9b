//! Pure rendering of viewer state into status cards and a copyable report.

use serde::Serialize;
use serde_json::json;

use super::ClientDiagnosticState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTone {
    Ok,
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCard {
    pub title: &'static str,
    pub status: String,
    pub tone: CardTone,
}

impl StatusCard {
    pub fn tone_class(&self) -> &'static str {
        match self.tone {
            CardTone::Ok => "ok",
            CardTone::Pending => "pending",
            CardTone::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub cards: Vec<StatusCard>,
    pub text: String,
}

pub fn render(state: &ClientDiagnosticState) -> Report {
    Report {
        cards: vec![client_card(state), server_card(state), error_card(state)],
        text: report_text(state),
    }
}

fn client_card(state: &ClientDiagnosticState) -> StatusCard {
    let (status, tone) = match &state.client_info {
        Some(probe) if probe.network_available => ("Ready".to_string(), CardTone::Ok),
        Some(_) => ("Degraded".to_string(), CardTone::Error),
        None => ("Not probed".to_string(), CardTone::Pending),
    };
    StatusCard {
        title: "Client Environment",
        status,
        tone,
    }
}

fn server_card(state: &ClientDiagnosticState) -> StatusCard {
    let success = state
        .server_snapshot
        .as_ref()
        .and_then(|s| s.get("success"))
        .and_then(|s| s.as_bool());

    let (status, tone) = if state.loading {
        ("Loading...", CardTone::Pending)
    } else {
        match success {
            Some(true) => ("Connected", CardTone::Ok),
            Some(false) => ("Server reported failure", CardTone::Error),
            None if state.server_data.starts_with("ERROR:") => ("Error", CardTone::Error),
            None => ("Not connected", CardTone::Pending),
        }
    };
    StatusCard {
        title: "Server Connectivity",
        status: status.to_string(),
        tone,
    }
}

fn error_card(state: &ClientDiagnosticState) -> StatusCard {
    StatusCard {
        title: "Errors",
        status: state.errors.len().to_string(),
        tone: if state.errors.is_empty() {
            CardTone::Ok
        } else {
            CardTone::Error
        },
    }
}

fn report_text(state: &ClientDiagnosticState) -> String {
    let summary = json!({
        "clientInfo": state.client_info,
        "hasServerData": state.server_snapshot.is_some(),
        "serverSuccess": state
            .server_snapshot
            .as_ref()
            .and_then(|s| s.get("success"))
            .cloned(),
        "logCount": state.logs.len(),
        "errors": state.errors,
        "loading": state.loading,
    });
    let summary = serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string());

    let mut text = String::new();
    text.push_str("=== CLIENT LOGS ===\n");
    for line in &state.logs {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("\n=== STATE SUMMARY ===\n");
    text.push_str(&summary);
    text.push_str("\n\n=== SERVER RESPONSE ===\n");
    text.push_str(&state.server_data);
    text
}
