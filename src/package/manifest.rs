//! `package.json` reading and release write-back.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ManifestError;

use super::PackageId;

/// Manifest file name inside each package directory.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// The parts of a package manifest a release cares about.
///
/// Other `package.json` fields are ignored on read and preserved on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    /// Dependency name to declared range, in declaration order.
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

/// Source of package manifests for the bump calculator.
pub trait ManifestLoader {
    fn load(&self, package: &PackageId) -> Result<Manifest, ManifestError>;
}

/// In-memory manifests, keyed by package identifier.
impl ManifestLoader for HashMap<PackageId, Manifest> {
    fn load(&self, package: &PackageId) -> Result<Manifest, ManifestError> {
        self.get(package)
            .cloned()
            .ok_or_else(|| ManifestError::NotFound {
                package: package.to_string(),
                path: PathBuf::from(package.as_str()).join(MANIFEST_FILE_NAME),
            })
    }
}

/// A repository checkout whose packages live below `root`.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_dir(&self, package: &PackageId) -> PathBuf {
        self.root.join(package.as_str())
    }

    pub fn manifest_path(&self, package: &PackageId) -> PathBuf {
        self.package_dir(package).join(MANIFEST_FILE_NAME)
    }

    /// Write a new version and updated dependency ranges into a manifest.
    ///
    /// Key order, indentation style and unrelated fields are preserved. Only
    /// dependencies already declared under `dependencies` are rewritten.
    pub fn write_release(
        &self,
        package: &PackageId,
        new_version: &Version,
        range_updates: &IndexMap<String, String>,
    ) -> Result<PathBuf, ManifestError> {
        let path = self.manifest_path(package);
        let content = self.read(package, &path)?;

        let mut json: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ManifestError::InvalidJson {
                package: package.to_string(),
                source,
            })?;

        let Some(object) = json.as_object_mut() else {
            return Err(ManifestError::InvalidJson {
                package: package.to_string(),
                source: serde::de::Error::custom("manifest root is not an object"),
            });
        };

        object.insert(
            "version".to_string(),
            serde_json::Value::String(new_version.to_string()),
        );

        if let Some(deps) = object
            .get_mut("dependencies")
            .and_then(serde_json::Value::as_object_mut)
        {
            for (name, range) in range_updates {
                if let Some(slot) = deps.get_mut(name) {
                    *slot = serde_json::Value::String(range.clone());
                }
            }
        }

        let output =
            serde_json::to_string_pretty(&json).map_err(|source| ManifestError::InvalidJson {
                package: package.to_string(),
                source,
            })?;

        // npm uses trailing newline
        write_atomic(&path, &format!("{}\n", output)).map_err(|source| {
            ManifestError::WriteFailed {
                package: package.to_string(),
                path: path.clone(),
                source,
            }
        })?;

        debug!(package = %package, path = %path.display(), "Wrote manifest");
        Ok(path)
    }

    fn read(&self, package: &PackageId, path: &Path) -> Result<String, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                package: package.to_string(),
                path: path.to_path_buf(),
            });
        }

        std::fs::read_to_string(path).map_err(|source| ManifestError::ReadFailed {
            package: package.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ManifestLoader for Workspace {
    fn load(&self, package: &PackageId) -> Result<Manifest, ManifestError> {
        let path = self.manifest_path(package);
        let content = self.read(package, &path)?;

        serde_json::from_str(&content).map_err(|source| ManifestError::InvalidJson {
            package: package.to_string(),
            source,
        })
    }
}

/// Replace `path` with `content` via a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
