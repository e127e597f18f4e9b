//! Application manifest (`package.json`) summary.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::probe::{probe, Probe};

/// Manifest fields we care about; everything else is ignored
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    scripts: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Reduced manifest: names only, no versions or script bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub scripts: Vec<String>,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

impl PackageInfo {
    pub fn declares(&self, dependency: &str) -> bool {
        self.dependencies.iter().any(|d| d == dependency)
            || self.dev_dependencies.iter().any(|d| d == dependency)
    }
}

/// Parse the manifest at `path`. Absent or malformed manifests degrade to an error.
pub fn read_manifest(path: &Path) -> Probe<PackageInfo> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    probe(&format!("Failed to read {}", file_name), || {
        if !path.exists() {
            anyhow::bail!("{} not found", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_manifest(&content)
    })
}

fn parse_manifest(content: &str) -> anyhow::Result<PackageInfo> {
    let manifest: Manifest = serde_json::from_str(content).context("invalid JSON")?;

    Ok(PackageInfo {
        name: manifest.name,
        version: manifest.version,
        scripts: manifest.scripts.into_keys().collect(),
        dependencies: manifest.dependencies.into_keys().collect(),
        dev_dependencies: manifest.dev_dependencies.into_keys().collect(),
    })
}
