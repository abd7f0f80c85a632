//! Bump level selection and semver arithmetic.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::VersionError;
use crate::git::{Commit, CommitType};

/// Magnitude of a release. Ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl BumpLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine the bump level for a package's commits.
///
/// - Breaking changes = major
/// - `feat` = minor
/// - anything else, including no commits at all = patch
///
/// Every touched package gets at least a patch release.
pub fn determine_bump_level<'a, I>(commits: I) -> BumpLevel
where
    I: IntoIterator<Item = &'a Commit>,
{
    let mut highest = BumpLevel::Patch;

    for commit in commits {
        if commit.breaking {
            return BumpLevel::Major;
        }
        if commit.commit_type == CommitType::Feat {
            highest = highest.max(BumpLevel::Minor);
        }
    }

    highest
}

/// Apply a bump level to a version.
///
/// Fails when the bumped component is already `u64::MAX`.
pub fn apply_bump_to_version(version: &Version, level: BumpLevel) -> Result<Version, VersionError> {
    let overflow = || VersionError::Overflow {
        version: version.to_string(),
        level: level.to_string(),
    };

    let next = match level {
        BumpLevel::Major => Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
        BumpLevel::Minor => {
            Version::new(version.major, version.minor.checked_add(1).ok_or_else(overflow)?, 0)
        }
        BumpLevel::Patch => Version::new(
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    Ok(next)
}

/// Parse a manifest version, accepting only plain `MAJOR.MINOR.PATCH`.
pub fn parse_release_version(raw: &str) -> Result<Version, VersionError> {
    let version =
        Version::parse(raw.trim()).map_err(|e| VersionError::ParseFailed(raw.to_string(), e))?;

    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(VersionError::Unsupported(raw.to_string()));
    }

    Ok(version)
}
