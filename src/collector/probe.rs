//! Best-effort probes with field-level degradation.
//!
//! A probe that fails is reported in place as `{"error": "..."}` while the
//! rest of the snapshot stays populated.

use serde::Serialize;

/// Outcome of one optional probe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Probe<T> {
    Ok(T),
    Failed { error: String },
}

impl<T> Probe<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Probe::Ok(value) => Some(value),
            Probe::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Probe::Ok(_) => None,
            Probe::Failed { error } => Some(error),
        }
    }
}

/// Run a fallible probe; on failure tag the result with `"<context>: <error chain>"`.
pub fn probe<T>(context: &str, f: impl FnOnce() -> anyhow::Result<T>) -> Probe<T> {
    match f() {
        Ok(value) => Probe::Ok(value),
        Err(e) => {
            tracing::debug!("{} ({:#})", context, e);
            Probe::Failed {
                error: format!("{}: {:#}", context, e),
            }
        }
    }
}
