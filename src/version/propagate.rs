//! Dependency range propagation between bumped packages.
//!
//! Runs once over a fixed [`BumpSet`]. A dependent's own level and version are
//! never changed, packages without a bump are never visited, and an updated
//! range does not trigger further bumps.

use tracing::{debug, info};

use crate::package::PackageId;

use super::bump::BumpLevel;
use super::calculator::BumpSet;

/// Range operators that are updated automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperator {
    /// `~`: patch-level compatibility.
    Tilde,
    /// `^`: minor-or-patch compatibility.
    Caret,
}

impl RangeOperator {
    /// Detect the operator a range starts with. Pinned or exotic ranges give `None`.
    pub fn of(range: &str) -> Option<Self> {
        match range.chars().next() {
            Some('~') => Some(Self::Tilde),
            Some('^') => Some(Self::Caret),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Tilde => '~',
            Self::Caret => '^',
        }
    }

    /// Whether a dependency bump of `level` stays inside this operator's window.
    pub fn accepts(&self, level: BumpLevel) -> bool {
        match self {
            Self::Tilde => level == BumpLevel::Patch,
            Self::Caret => matches!(level, BumpLevel::Minor | BumpLevel::Patch),
        }
    }
}

/// New range for a declared `range` on a dependency bumped by `level` to `new_version`.
///
/// `None` when the range is pinned/exotic or the bump falls outside its window.
pub fn updated_range(range: &str, level: BumpLevel, new_version: &semver::Version) -> Option<String> {
    let operator = RangeOperator::of(range)?;
    operator
        .accepts(level)
        .then(|| format!("{}{}", operator.as_char(), new_version))
}

/// Record dependency range updates on every bumped package.
///
/// For each bumped package P and each dependency declared by P whose name is
/// another bumped package D, P gets `D -> <op><D.new_version>` when the
/// declared operator's window admits D's level. Updates follow P's
/// declaration order.
pub fn propagate_dependency_ranges(mut bumps: BumpSet) -> BumpSet {
    let mut planned: Vec<(PackageId, String, String)> = Vec::new();

    for bump in &bumps {
        debug!("{}: checking dependencies...", bump.name());

        for (dep, range) in &bump.manifest.dependencies {
            let Some(target) = bumps.find_by_name(dep) else {
                continue;
            };
            if target.package == bump.package {
                continue;
            }

            match updated_range(range, target.level, &target.new_version) {
                Some(new_range) => {
                    info!(
                        "{}: bumping {} from {} to {}",
                        bump.name(),
                        dep,
                        range,
                        new_range
                    );
                    planned.push((bump.package.clone(), dep.clone(), new_range));
                }
                None => {
                    debug!(
                        "{}: skipping {} {} ({} bump to {})",
                        bump.name(),
                        dep,
                        range,
                        target.level,
                        target.new_version
                    );
                }
            }
        }
    }

    for (package, dep, new_range) in planned {
        if let Some(bump) = bumps.get_mut(&package) {
            bump.dependency_range_updates.insert(dep, new_range);
        }
    }

    bumps
}
