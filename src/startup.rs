//! Startup log recorded once during bootstrap.
//!
//! Built explicitly from the loaded [`Config`] in `main` and emitted through
//! `tracing`; the recorded lines are also served by `/api/startup-check`.

use std::path::Path;

use crate::collector::process::{SERVER_NAME, SERVER_VERSION};
use crate::config::Config;
use crate::types::iso_now;

#[derive(Debug, Clone, Default)]
pub struct StartupLogger {
    entries: Vec<String>,
}

impl StartupLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the standard bootstrap lines for `config`.
    pub fn bootstrap(config: &Config, cwd: Option<&Path>) -> Self {
        let mut log = Self::new();
        log.record(format!("🚀 {} initializing", SERVER_NAME));
        log.record(format!("🌍 Environment: {}", config.app_env));
        log.record(format!("📦 Server version: {}", SERVER_VERSION));
        match cwd {
            Some(cwd) => log.record(format!("📍 Config CWD: {}", cwd.display())),
            None => log.record("📍 Config CWD: unavailable"),
        }
        if let Some(root) = &config.root_dir {
            log.record(format!("📂 Diagnostics root: {}", root.display()));
        }
        log.record(format!("🔌 Bind address: {}", config.socket_addr()));
        log.record(format!(
            "🩺 Diagnostics endpoint enabled: {}",
            config.diagnostics_enabled
        ));
        log.record("✅ Configuration loaded successfully");
        log
    }

    pub fn record(&mut self, message: impl AsRef<str>) {
        self.entries
            .push(format!("[{}] {}", iso_now(), message.as_ref()));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Emit every entry to `sink`, in order.
    pub fn emit_with(&self, mut sink: impl FnMut(&str)) {
        for entry in &self.entries {
            sink(entry);
        }
    }

    pub fn emit(&self) {
        self.emit_with(|entry| tracing::info!("{}", entry));
    }
}
