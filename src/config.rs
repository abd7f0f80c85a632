//! Release configuration loaded from `release.config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "release.config.json";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub release: ReleaseConfig,
}

/// The `release` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Directories whose immediate children are packages, e.g. `["packages", "apps"]`.
    #[serde(default)]
    pub scan: Vec<String>,

    /// GitHub `owner/name` used to build commit and compare links.
    pub repository: String,

    /// Changelog / PR body headings.
    #[serde(default)]
    pub pull_request: SectionLabels,
}

/// Headings used when rendering the changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SectionLabels {
    pub header: String,
    pub feat: String,
    pub fix: String,
    pub docs: String,
    pub other: String,
    pub dependencies: String,
}

impl Default for SectionLabels {
    fn default() -> Self {
        Self {
            header: ":robot: I have created a release *beep* *boop*".to_string(),
            feat: "### Features".to_string(),
            fix: "### Bug Fixes".to_string(),
            docs: "### Documentation".to_string(),
            other: "### Other Changes".to_string(),
            dependencies: "### Dependencies".to_string(),
        }
    }
}

impl Config {
    /// Starter configuration written by `monorel init`.
    pub fn starter(repository: impl Into<String>) -> Self {
        Self {
            release: ReleaseConfig {
                scan: vec!["packages".to_string(), "apps".to_string()],
                repository: repository.into(),
                pull_request: SectionLabels::default(),
            },
        }
    }
}

/// Parse configuration from a JSON string.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    serde_json::from_str(content).map_err(ConfigError::Invalid)
}

/// Load configuration from the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFailed)?;
    parse_config(&content)
}

/// Find and load configuration starting from `start_dir`.
///
/// Walks up the directory tree until a configuration file is found.
pub fn find_and_load_config_from(start_dir: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let start_dir = start_dir.as_ref();
    let mut dir = start_dir;

    loop {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return load_config(config_path);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Err(ConfigError::NotFound(start_dir.join(CONFIG_FILE_NAME)))
}

/// Write the starter configuration into `dir`.
pub fn write_starter_config(
    dir: impl AsRef<Path>,
    repository: &str,
    force: bool,
) -> Result<PathBuf, ConfigError> {
    let path = dir.as_ref().join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path));
    }

    let content =
        serde_json::to_string_pretty(&Config::starter(repository)).map_err(ConfigError::Invalid)?;
    std::fs::write(&path, format!("{}\n", content)).map_err(ConfigError::WriteFailed)?;

    Ok(path)
}
