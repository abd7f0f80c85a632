//! Error types for monorel modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open git repository: {0}. Run monorel from within a git repository")]
    OpenRepository(#[source] git2::Error),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to read commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to diff commit {0}: {1}")]
    DiffFailed(String, #[source] git2::Error),

    #[error("Background git task failed: {0}")]
    TaskFailed(#[source] tokio::task::JoinError),
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Version '{0}' carries pre-release or build metadata, only MAJOR.MINOR.PATCH is supported")]
    Unsupported(String),

    #[error("Cannot apply a {level} bump to {version}: component overflows")]
    Overflow { version: String, level: String },
}

/// Errors from reading or writing package manifests.
///
/// Every variant names the package so a failure can be traced without the
/// surrounding run.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{package}: manifest not found at {}", path.display())]
    NotFound { package: String, path: PathBuf },

    #[error("{package}: failed to read {}: {source}", path.display())]
    ReadFailed {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{package}: invalid manifest JSON: {source}")]
    InvalidJson {
        package: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{package}: {source}")]
    InvalidVersion {
        package: String,
        #[source]
        source: VersionError,
    },

    #[error("{package}: failed to write {}: {source}", path.display())]
    WriteFailed {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Package identifier the error belongs to.
    pub fn package(&self) -> &str {
        match self {
            Self::NotFound { package, .. }
            | Self::ReadFailed { package, .. }
            | Self::InvalidJson { package, .. }
            | Self::InvalidVersion { package, .. }
            | Self::WriteFailed { package, .. } => package,
        }
    }
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error("Configuration file already exists: {}. Use --force to overwrite.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write configuration: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write changelog {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a release run.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),
}
