//! Per-package bump computation.

use indexmap::IndexMap;
use semver::Version;
use serde::Serialize;
use tracing::{error, info};

use crate::error::ManifestError;
use crate::git::Commit;
use crate::package::{Manifest, ManifestLoader, PackageId};

use super::bump::{BumpLevel, apply_bump_to_version, determine_bump_level, parse_release_version};

/// Release decision for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bump {
    pub package: PackageId,
    pub manifest: Manifest,
    pub level: BumpLevel,
    pub current_version: Version,
    pub new_version: Version,
    pub commits: Vec<Commit>,
    /// Dependency name to new range. Only the propagator writes here.
    pub dependency_range_updates: IndexMap<String, String>,
}

impl Bump {
    /// Package name from the manifest.
    pub fn name(&self) -> &str {
        &self.manifest.name
    }
}

/// Compute the bump for one package from its manifest.
///
/// Commits are attributed when any touched file lies under the package path.
pub fn compute_bump(
    package: &PackageId,
    commits: &[Commit],
    manifest: Manifest,
) -> Result<Bump, ManifestError> {
    let attributed: Vec<Commit> = commits
        .iter()
        .filter(|c| c.touches(package.as_str()))
        .cloned()
        .collect();

    let current_version =
        parse_release_version(&manifest.version).map_err(|source| ManifestError::InvalidVersion {
            package: package.to_string(),
            source,
        })?;

    let level = determine_bump_level(&attributed);
    let new_version = apply_bump_to_version(&current_version, level).map_err(|source| {
        ManifestError::InvalidVersion {
            package: package.to_string(),
            source,
        }
    })?;

    Ok(Bump {
        package: package.clone(),
        manifest,
        level,
        current_version,
        new_version,
        commits: attributed,
        dependency_range_updates: IndexMap::new(),
    })
}

/// Bumps keyed by package, in first-discovery order.
///
/// Entries are write-once: inserting a package that is already present keeps
/// the first computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BumpSet {
    bumps: IndexMap<PackageId, Bump>,
}

impl BumpSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `bump` unless its package already has one. Returns whether it was inserted.
    pub fn insert(&mut self, bump: Bump) -> bool {
        if self.bumps.contains_key(&bump.package) {
            return false;
        }
        self.bumps.insert(bump.package.clone(), bump);
        true
    }

    pub fn contains(&self, package: &PackageId) -> bool {
        self.bumps.contains_key(package)
    }

    pub fn get(&self, package: &PackageId) -> Option<&Bump> {
        self.bumps.get(package)
    }

    pub(crate) fn get_mut(&mut self, package: &PackageId) -> Option<&mut Bump> {
        self.bumps.get_mut(package)
    }

    /// Find a bumped package by its manifest name.
    pub fn find_by_name(&self, name: &str) -> Option<&Bump> {
        self.bumps.values().find(|b| b.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bump> {
        self.bumps.values()
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
        self.bumps.keys()
    }

    pub fn len(&self) -> usize {
        self.bumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bumps.is_empty()
    }
}

impl<'a> IntoIterator for &'a BumpSet {
    type Item = &'a Bump;
    type IntoIter = indexmap::map::Values<'a, PackageId, Bump>;

    fn into_iter(self) -> Self::IntoIter {
        self.bumps.values()
    }
}

/// Outcome of computing bumps for a set of packages.
#[derive(Debug, Default)]
pub struct BumpOutcome {
    pub bumps: BumpSet,
    /// Packages whose bump could not be computed. Never mixed into `bumps`.
    pub failures: Vec<ManifestError>,
}

/// Compute bumps for `packages`, adding to `existing`.
///
/// Packages already present in `existing` are skipped. A manifest failure is
/// recorded for that package and does not affect the others.
pub fn calculate_bumps(
    existing: BumpSet,
    packages: &[PackageId],
    commits: &[Commit],
    loader: &dyn ManifestLoader,
) -> BumpOutcome {
    let mut outcome = BumpOutcome {
        bumps: existing,
        failures: Vec::new(),
    };

    for package in packages {
        if outcome.bumps.contains(package) {
            continue;
        }

        let bump = loader
            .load(package)
            .and_then(|manifest| compute_bump(package, commits, manifest));

        match bump {
            Ok(bump) => {
                info!(
                    package = %package,
                    name = %bump.name(),
                    commits = bump.commits.len(),
                    "{}: bumping from {} to {} [{}]",
                    bump.name(),
                    bump.current_version,
                    bump.new_version,
                    bump.level
                );
                outcome.bumps.insert(bump);
            }
            Err(e) => {
                error!(package = %package, "Cannot compute bump: {}", e);
                outcome.failures.push(e);
            }
        }
    }

    outcome
}
