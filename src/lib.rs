//! monorel - per-package releases for monorepos from conventional commits.
//!
//! # Overview
//!
//! monorel reads a range of git commits, classifies them by conventional-commit
//! type, attributes them to the packages whose files they touch, computes a
//! semantic-version bump per package, updates dependency ranges between bumped
//! packages and renders a Markdown changelog suitable for a release PR body.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;
pub mod package;
pub mod release;
pub mod version;

// Re-export commonly used types
pub use config::{Config, ReleaseConfig, SectionLabels};
pub use error::{ChangelogError, ConfigError, GitError, ManifestError, ReleaseError, VersionError};
pub use git::{Commit, CommitType};
pub use package::{Manifest, PackageId, Workspace};
pub use release::{ReleaseContext, plan_release, prepare_release};
pub use version::{Bump, BumpLevel, BumpSet};
