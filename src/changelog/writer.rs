//! Prepend release sections to per-package `CHANGELOG.md` files.

use std::path::Path;

use semver::Version;
use tracing::debug;

use crate::error::ChangelogError;
use crate::package::manifest::write_atomic;

/// Changelog file name inside each package directory.
pub const CHANGELOG_FILE_NAME: &str = "CHANGELOG.md";

/// Header for newly created changelog files.
pub const CHANGELOG_HEADER: &str = "# Changelog\n\n";

/// Outcome of writing a package changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogWrite {
    Written,
    /// A section for this version already exists; the file was left alone.
    AlreadyPresent,
}

/// Insert `section` for `version` into the changelog at `path`.
///
/// - Creates the file with a header if it doesn't exist
/// - Inserts above the newest existing version, below any `[Unreleased]` section
/// - Leaves the file untouched if `version` already has a section
pub fn prepend_section(
    path: &Path,
    version: &Version,
    section: &str,
) -> Result<ChangelogWrite, ChangelogError> {
    let existing = if path.exists() {
        Some(
            std::fs::read_to_string(path).map_err(|source| ChangelogError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?,
        )
    } else {
        None
    };

    let section = section.trim_end();
    let new_content = match existing {
        Some(content) => {
            let releases = read_releases(&content);
            let version_str = version.to_string();
            if releases.versions.iter().any(|v| *v == version_str) {
                debug!(path = %path.display(), %version, "Changelog already has version");
                return Ok(ChangelogWrite::AlreadyPresent);
            }

            let insertion_point = find_insertion_point(&content, releases.has_unreleased);
            let mut new_content = String::with_capacity(content.len() + section.len() + 3);
            new_content.push_str(&content[..insertion_point]);
            if !new_content.is_empty() && !new_content.ends_with("\n\n") {
                new_content.push('\n');
            }
            new_content.push_str(section);
            new_content.push_str("\n\n");
            new_content.push_str(&content[insertion_point..]);
            new_content
        }
        None => format!("{}{}\n", CHANGELOG_HEADER, section),
    };

    write_atomic(path, &new_content).map_err(|source| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ChangelogWrite::Written)
}

/// Write the aggregate changelog to `path`, replacing any existing file.
pub fn write_changelog_file(path: &Path, content: &str) -> Result<(), ChangelogError> {
    write_atomic(path, content).map_err(|source| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Releases already recorded in a changelog.
#[derive(Debug, Default)]
pub struct ExistingReleases {
    pub has_unreleased: bool,
    /// Release versions in file order.
    pub versions: Vec<String>,
}

/// Read the release headings of changelog `content` using parse-changelog.
///
/// Content without any release heading yields no releases.
pub fn read_releases(content: &str) -> ExistingReleases {
    match parse_changelog::parse(content) {
        Ok(changelog) => ExistingReleases {
            has_unreleased: changelog
                .keys()
                .any(|title| title.eq_ignore_ascii_case("unreleased")),
            versions: changelog
                .keys()
                .filter(|title| !title.eq_ignore_ascii_case("unreleased"))
                .map(|title| version_of(title).to_string())
                .collect(),
        },
        Err(e) => {
            debug!("No release sections found: {}", e);
            ExistingReleases::default()
        }
    }
}

/// Version part of a release title such as `[1.2.3](link) (2024-01-01)`.
fn version_of(title: &str) -> &str {
    let title = title.trim();
    let title = match title.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or(rest),
        None => title,
    };
    title.split_whitespace().next().unwrap_or(title)
}

/// Whether the changelog already has a section for `version`.
pub fn has_version(content: &str, version: &Version) -> bool {
    let version = version.to_string();
    read_releases(content).versions.iter().any(|v| *v == version)
}

/// Find the position to insert a new version section.
/// Returns the byte offset after the header and, when `has_unreleased`, after
/// the [Unreleased] section.
pub fn find_insertion_point(content: &str, has_unreleased: bool) -> usize {
    let mut offset = 0;
    let mut in_unreleased = false;

    for line in content.split_inclusive('\n') {
        if line.starts_with("## ") {
            let is_unreleased = line.to_lowercase().contains("unreleased");
            if has_unreleased && is_unreleased {
                in_unreleased = true;
            } else if !in_unreleased || !is_unreleased {
                return offset;
            }
        }
        offset += line.len();
    }

    content.len()
}
