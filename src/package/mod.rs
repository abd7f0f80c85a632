//! Package discovery and manifests.

pub mod discover;
pub mod manifest;

use serde::{Deserialize, Serialize};

pub use discover::discover_packages;
pub use manifest::{MANIFEST_FILE_NAME, Manifest, ManifestLoader, Workspace};

/// Root-relative package path such as `packages/foo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
