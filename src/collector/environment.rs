//! Environment variable access and the allowlisted environment snapshot.

use std::collections::{BTreeMap, HashMap};

/// Read access to environment variables.
///
/// The server reads the process environment; tests and embedders can supply
/// a fixed map instead.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Deployment and platform identifiers reported verbatim when set
pub const REPORTED_VARS: &[&str] = &[
    "NODE_ENV",
    "PORT",
    "WEBSITE_HOSTNAME",
    "WEBSITE_SITE_NAME",
    "WEBSITE_RESOURCE_GROUP",
    "WEBSITE_OWNER_NAME",
    "WEBSITE_PLATFORM_VERSION",
    "WEBSITE_NODE_DEFAULT_VERSION",
    "WEBSITE_NPM_DEFAULT_VERSION",
    "SCM_COMMIT_ID",
    "BUILD_FLAGS",
    "XDG_CACHE_HOME",
    "WEBSITE_INSTANCE_ID",
    "COMPUTERNAME",
    "WEBSITE_SKU",
    "WEBSITE_ROLE_INSTANCE_ID",
    "TEMP",
    "TMP",
    "HOME",
    "WEBSITE_WARMUP_PATH",
];

/// Credentials reported only as a presence flag
pub const CREDENTIAL_VARS: &[&str] = &["AZURE_CLIENT_ID", "AZURE_CLIENT_SECRET", "AZURE_TENANT_ID"];

pub const SET: &str = "SET";
pub const NOT_SET: &str = "NOT_SET";

/// Build the `environment` section.
///
/// Unset reported variables are omitted. Credential variables are always
/// present and never carry their value; an empty value counts as unset.
pub fn snapshot(env: &dyn EnvSource) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    for key in REPORTED_VARS {
        if let Some(value) = env.var(key) {
            out.insert(key.to_string(), value);
        }
    }

    for key in CREDENTIAL_VARS {
        let flag = match env.var(key) {
            Some(value) if !value.is_empty() => SET,
            _ => NOT_SET,
        };
        out.insert(key.to_string(), flag.to_string());
    }

    out
}
