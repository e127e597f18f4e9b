//! Server configuration loaded from environment variables (after `.env`).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::collector::environment::EnvSource;
use crate::collector::filesystem::ProbePaths;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid PORT '{0}': expected 1-65535")]
    InvalidPort(String),

    #[error("Invalid BIND_ADDR '{0}'")]
    InvalidBindAddr(String),

    #[error("Invalid {key} '{value}': expected true/false")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Deployment environment name (`APP_ENV`, else `NODE_ENV`)
    pub app_env: String,
    /// When false the diagnostics endpoint and page answer 404
    pub diagnostics_enabled: bool,
    /// Directory to probe instead of the process working directory
    pub root_dir: Option<PathBuf>,
    pub paths: ProbePaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            app_env: "development".to_string(),
            diagnostics_enabled: true,
            root_dir: None,
            paths: ProbePaths::default(),
        }
    }
}

impl Config {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(port) = non_empty(env, "PORT") {
            config.port = match port.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => return Err(ConfigError::InvalidPort(port)),
            };
        }

        if let Some(addr) = non_empty(env, "BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(addr))?;
        }

        if let Some(name) = non_empty(env, "APP_ENV").or_else(|| non_empty(env, "NODE_ENV")) {
            config.app_env = name;
        }

        if let Some(flag) = non_empty(env, "DIAGNOSTICS_ENABLED") {
            config.diagnostics_enabled = parse_flag("DIAGNOSTICS_ENABLED", &flag)?;
        }

        config.root_dir = non_empty(env, "DIAGNOSTICS_ROOT").map(PathBuf::from);

        if let Some(manifest) = non_empty(env, "DIAGNOSTICS_MANIFEST") {
            config.paths.manifest = manifest;
        }
        if let Some(build_dir) = non_empty(env, "DIAGNOSTICS_BUILD_DIR") {
            config.paths.build_dir = build_dir;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn non_empty(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}
