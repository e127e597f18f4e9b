//! Process and host facts.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use sysinfo::System;

use super::probe::{probe, Probe};

pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub server_version: &'static str,
    pub platform: &'static str,
    pub family: &'static str,
    pub arch: &'static str,
    pub pid: u32,
    /// Seconds since the server started
    pub uptime: f64,
    pub cwd: String,
    pub exec_path: Option<String>,
    pub argv: Vec<String>,
    pub memory_usage: Probe<MemoryUsage>,
    pub versions: BTreeMap<&'static str, String>,
}

/// Memory figures in bytes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_memory: u64,
    pub system_total: u64,
    pub system_used: u64,
}

pub fn snapshot(cwd: &Path, started_at: Instant) -> ProcessInfo {
    ProcessInfo {
        server_version: SERVER_VERSION,
        platform: std::env::consts::OS,
        family: std::env::consts::FAMILY,
        arch: std::env::consts::ARCH,
        pid: std::process::id(),
        uptime: started_at.elapsed().as_secs_f64(),
        cwd: cwd.display().to_string(),
        exec_path: std::env::current_exe()
            .ok()
            .map(|p| p.display().to_string()),
        argv: std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect(),
        memory_usage: probe("Failed to read memory usage", memory_usage),
        versions: versions(),
    }
}

fn memory_usage() -> anyhow::Result<MemoryUsage> {
    let pid = sysinfo::get_current_pid().map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut sys = System::new();
    sys.refresh_memory();
    if !sys.refresh_process(pid) {
        anyhow::bail!("process {} not visible", pid);
    }
    let process = sys
        .process(pid)
        .ok_or_else(|| anyhow::anyhow!("process {} not visible", pid))?;

    Ok(MemoryUsage {
        rss: process.memory(),
        virtual_memory: process.virtual_memory(),
        system_total: sys.total_memory(),
        system_used: sys.used_memory(),
    })
}

fn versions() -> BTreeMap<&'static str, String> {
    let mut versions = BTreeMap::new();
    versions.insert("server", SERVER_VERSION.to_string());
    if let Some(v) = System::os_version() {
        versions.insert("os", v);
    }
    if let Some(v) = System::kernel_version() {
        versions.insert("kernel", v);
    }
    if let Some(v) = System::host_name() {
        versions.insert("hostName", v);
    }
    versions
}
