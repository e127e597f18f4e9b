//! Filesystem existence checks and bounded directory listings.

use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use super::probe::{probe, Probe};

/// Maximum entries reported for the working directory
pub const ROOT_LISTING_LIMIT: usize = 20;
/// Maximum entries reported for the build-output directory
pub const BUILD_LISTING_LIMIT: usize = 10;

/// Names of the application paths probed under the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePaths {
    pub manifest: String,
    pub build_dir: String,
    pub dependency_dir: String,
    pub source_dir: String,
    /// Framework config files; any one present counts
    pub config_files: Vec<String>,
}

impl Default for ProbePaths {
    fn default() -> Self {
        Self {
            manifest: "package.json".to_string(),
            build_dir: ".next".to_string(),
            dependency_dir: "node_modules".to_string(),
            source_dir: "src".to_string(),
            config_files: vec!["next.config.ts".to_string(), "next.config.js".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemChecks {
    pub current_dir: String,
    pub cwd_exists: bool,
    pub package_json_exists: bool,
    pub next_config_exists: bool,
    pub build_dir_exists: bool,
    pub node_modules_exists: bool,
    pub src_dir_exists: bool,
}

pub fn checks(root: &Path, paths: &ProbePaths) -> FileSystemChecks {
    FileSystemChecks {
        current_dir: root.display().to_string(),
        cwd_exists: root.exists(),
        package_json_exists: root.join(&paths.manifest).exists(),
        next_config_exists: paths.config_files.iter().any(|f| root.join(f).exists()),
        build_dir_exists: root.join(&paths.build_dir).exists(),
        node_modules_exists: root.join(&paths.dependency_dir).exists(),
        src_dir_exists: root.join(&paths.source_dir).exists(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryContents {
    pub root_directory: String,
    pub files_count: usize,
    pub files: Vec<String>,
    pub next_build_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_build_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_build_error: Option<String>,
}

/// List the working directory and the build-output directory.
///
/// A failing root listing fails the whole section. The build directory only
/// affects its own `nextBuild*` fields.
pub fn directory_contents(root: &Path, paths: &ProbePaths) -> Probe<DirectoryContents> {
    probe("Failed to read directory", || {
        let files = list_entries(root, ROOT_LISTING_LIMIT)?;

        let build_path = root.join(&paths.build_dir);
        let (next_build_exists, next_build_files, next_build_error) = if !build_path.exists() {
            (false, None, Some("Build directory not found".to_string()))
        } else {
            match list_entries(&build_path, BUILD_LISTING_LIMIT) {
                Ok(entries) => (true, Some(entries), None),
                Err(e) => (
                    true,
                    None,
                    Some(format!("Failed to read build directory: {:#}", e)),
                ),
            }
        };

        Ok(DirectoryContents {
            root_directory: root.display().to_string(),
            files_count: files.len(),
            files,
            next_build_exists,
            next_build_files,
            next_build_error,
        })
    })
}

/// Read at most `limit` entry names, sorted for stable output.
fn list_entries(dir: &Path, limit: usize) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::with_capacity(limit);
    for entry in std::fs::read_dir(dir).with_context(|| format!("{}", dir.display()))? {
        if names.len() == limit {
            break;
        }
        let entry = entry.with_context(|| format!("{}", dir.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
