//! Diagnostic snapshot collection
//!
//! Assembles one point-in-time JSON document per request from:
//! - allowlisted environment variables (credentials as presence flags only)
//! - process and host facts
//! - filesystem existence checks and bounded directory listings
//! - the application manifest
//! - the inbound request's URL and headers
//!
//! Optional probes degrade to an `error` field in place. Only an unexpected
//! failure of the whole assembly produces the 500 failure document.

pub mod environment;
pub mod filesystem;
pub mod package;
pub mod probe;
pub mod process;

use anyhow::Context;
use axum::http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::types::iso_now;
use environment::EnvSource;
use filesystem::{DirectoryContents, FileSystemChecks, ProbePaths};
use package::PackageInfo;
use probe::Probe;
use process::{ProcessInfo, SERVER_NAME, SERVER_VERSION};

pub const SERVER_LABEL: &str = "Rust Diagnostics API";
pub const SERVER_LABEL_ERROR: &str = "Rust Diagnostics API (Error State)";

/// Everything the collector reads besides the request itself
pub struct CollectorContext {
    pub env: Arc<dyn EnvSource>,
    /// Directory to probe; `None` means the process working directory
    pub root: Option<PathBuf>,
    pub paths: ProbePaths,
    pub started_at: Instant,
}

impl CollectorContext {
    pub fn new(env: Arc<dyn EnvSource>, root: Option<PathBuf>, paths: ProbePaths) -> Self {
        Self {
            env,
            root,
            paths,
            started_at: Instant::now(),
        }
    }
}

/// The parts of the inbound request the collector reports
#[derive(Debug, Clone, Default)]
pub struct RequestFacts {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub success: bool,
    pub timestamp: String,
    pub server: &'static str,
    pub diagnostics: Diagnostics,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub environment: BTreeMap<String, String>,
    pub process_info: ProcessInfo,
    pub file_system_checks: FileSystemChecks,
    pub directory_contents: Probe<DirectoryContents>,
    pub package_info: Probe<PackageInfo>,
    pub runtime_checks: RuntimeChecks,
    pub performance_info: PerformanceInfo,
    pub request_headers: BTreeMap<String, String>,
    pub request_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeChecks {
    pub server_crate: &'static str,
    pub build_profile: &'static str,
    pub async_runtime: String,
    pub framework_resolution: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInfo {
    /// Milliseconds from request start to response assembly
    pub request_processing_time: u64,
    pub timestamp: String,
    /// Monotonic `[seconds, nanoseconds]` since server start
    pub hrtime: [u64; 2],
}

/// Body of the 500 response
#[derive(Debug, Clone, Serialize)]
pub struct FailureDocument {
    pub success: bool,
    pub timestamp: String,
    pub error: String,
    pub stack: String,
    pub logs: Vec<String>,
    pub server: &'static str,
}

impl FailureDocument {
    pub fn from_error(err: &anyhow::Error, timestamp: String, ctx: &CollectorContext) -> Self {
        let message = format!("{:#}", err);
        let stack = format!("{:?}", err);
        let cwd = match &ctx.root {
            Some(root) => root.display().to_string(),
            None => match std::env::current_dir() {
                Ok(p) => p.display().to_string(),
                Err(e) => format!("unavailable ({})", e),
            },
        };

        let mut trace = TraceLog::default();
        trace.push("❌ CRITICAL ERROR in diagnostic API");
        trace.push(format!("💥 Error message: {}", message));
        trace.push(format!("📚 Stack trace: {}", stack));
        trace.push(format!(
            "🔧 Process info: {} v{}, Platform: {}",
            SERVER_NAME,
            SERVER_VERSION,
            std::env::consts::OS
        ));
        trace.push(format!("📍 CWD: {}", cwd));

        Self {
            success: false,
            timestamp,
            error: message,
            stack,
            logs: trace.into_lines(),
            server: SERVER_LABEL_ERROR,
        }
    }
}

/// Result of one collection, ready to be sent
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(Box<DiagnosticsResponse>),
    Failure(FailureDocument),
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Success(_) => StatusCode::OK,
            Outcome::Failure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Ordered, timestamped trace of what the collector did
#[derive(Debug, Default)]
pub struct TraceLog {
    lines: Vec<String>,
}

impl TraceLog {
    pub fn push(&mut self, message: impl AsRef<str>) {
        self.lines
            .push(format!("[{}] {}", iso_now(), message.as_ref()));
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Collect a snapshot for one request.
///
/// Filesystem work runs on the blocking pool. Any error or panic during
/// assembly is turned into a [`FailureDocument`].
pub async fn collect(ctx: Arc<CollectorContext>, request: RequestFacts) -> Outcome {
    let started = Instant::now();
    let timestamp = iso_now();
    let runtime = async_runtime_flavor();

    let task_ctx = ctx.clone();
    let task_timestamp = timestamp.clone();
    let result = tokio::task::spawn_blocking(move || {
        assemble(&task_ctx, request, started, task_timestamp, runtime)
    })
    .await
    .map_err(|e| anyhow::anyhow!("diagnostics task failed: {}", e))
    .and_then(|r| r);

    match result {
        Ok(response) => Outcome::Success(Box::new(response)),
        Err(e) => {
            tracing::error!("Diagnostics collection failed: {:#}", e);
            Outcome::Failure(FailureDocument::from_error(&e, timestamp, &ctx))
        }
    }
}

/// Synchronous assembly; log lines follow the order of the work performed.
pub fn assemble(
    ctx: &CollectorContext,
    request: RequestFacts,
    started: Instant,
    timestamp: String,
    async_runtime: String,
) -> anyhow::Result<DiagnosticsResponse> {
    let mut trace = TraceLog::default();
    trace.push("🚀 Diagnostic API route called");

    let cwd = match &ctx.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };
    trace.push(format!("📍 Process CWD: {}", cwd.display()));
    trace.push(format!("🔧 Server Version: {} v{}", SERVER_NAME, SERVER_VERSION));

    let environment = environment::snapshot(ctx.env.as_ref());
    let process_info = process::snapshot(&cwd, ctx.started_at);
    trace.push(format!(
        "🌍 Platform: {} {}",
        process_info.platform, process_info.arch
    ));

    let file_system_checks = filesystem::checks(&cwd, &ctx.paths);
    let directory_contents = filesystem::directory_contents(&cwd, &ctx.paths);
    trace.push(format!(
        "🏗️ Build directory exists: {}",
        file_system_checks.build_dir_exists
    ));

    let package_info = package::read_manifest(&cwd.join(&ctx.paths.manifest));
    trace.push(format!(
        "📄 {} exists: {}",
        ctx.paths.manifest, file_system_checks.package_json_exists
    ));

    let runtime_checks = RuntimeChecks {
        server_crate: SERVER_NAME,
        build_profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        async_runtime,
        framework_resolution: match package_info.ok() {
            Some(info) if info.declares("next") => {
                format!("Next.js declared in {}", ctx.paths.manifest)
            }
            Some(_) => format!("Next.js not declared in {}", ctx.paths.manifest),
            None => format!("{} unavailable", ctx.paths.manifest),
        },
    };

    let since_start = ctx.started_at.elapsed();
    let performance_info = PerformanceInfo {
        request_processing_time: started.elapsed().as_millis() as u64,
        timestamp: timestamp.clone(),
        hrtime: [since_start.as_secs(), u64::from(since_start.subsec_nanos())],
    };
    trace.push(format!(
        "⏱️ Processing time: {}ms",
        performance_info.request_processing_time
    ));
    trace.push("✅ Server-side diagnostics completed successfully");

    Ok(DiagnosticsResponse {
        success: true,
        timestamp,
        server: SERVER_LABEL,
        diagnostics: Diagnostics {
            environment,
            process_info,
            file_system_checks,
            directory_contents,
            package_info,
            runtime_checks,
            performance_info,
            request_headers: request.headers,
            request_url: request.url,
        },
        logs: trace.into_lines(),
    })
}

fn async_runtime_flavor() -> String {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => format!("tokio {:?}", handle.runtime_flavor()),
        Err(_) => "none".to_string(),
    }
}
