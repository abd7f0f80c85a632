//! Release pipeline.
//!
//! Threads value objects through the stages: commits, affected packages,
//! initial bumps, propagated dependency ranges, rendered changelog. Each stage
//! takes its input by value or reference and returns a new aggregate, so the
//! only side effects are the git reads in [`prepare_release`] and the writes in
//! [`apply::apply_release`].

pub mod apply;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::changelog::{RenderOptions, render_changelog};
use crate::config::ReleaseConfig;
use crate::error::{ManifestError, ReleaseError};
use crate::git::{Commit, GitExecutor, fetch_commits};
use crate::package::{ManifestLoader, discover_packages};
use crate::version::{BumpSet, calculate_bumps, propagate_dependency_ranges};

pub use apply::apply_release;

/// Everything one release run produced.
#[derive(Debug)]
pub struct ReleaseContext {
    /// Commits in log order.
    pub commits: Vec<Commit>,
    pub bumps: BumpSet,
    /// Packages whose bump could not be computed.
    pub failures: Vec<ManifestError>,
    /// Rendered aggregate changelog / PR body.
    pub changelog: String,
}

impl ReleaseContext {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when no package changed.
    pub fn is_noop(&self) -> bool {
        self.bumps.is_empty()
    }
}

/// Render options for `config` on `date`.
pub fn render_options(config: &ReleaseConfig, date: NaiveDate) -> RenderOptions<'_> {
    RenderOptions {
        labels: &config.pull_request,
        repository: &config.repository,
        date,
    }
}

/// Run the pure pipeline over already classified commits.
pub fn plan_release(
    commits: Vec<Commit>,
    config: &ReleaseConfig,
    loader: &dyn ManifestLoader,
    date: NaiveDate,
) -> ReleaseContext {
    if config.scan.is_empty() {
        warn!("No scan roots configured; no package can be released");
    }

    let packages = discover_packages(&commits, &config.scan);
    debug!(count = packages.len(), "Discovered affected packages");

    let outcome = calculate_bumps(BumpSet::new(), &packages, &commits, loader);
    let bumps = propagate_dependency_ranges(outcome.bumps);

    if bumps.is_empty() {
        info!(commits = commits.len(), "No affected packages, no-op release");
    }

    let changelog = render_changelog(&bumps, &render_options(config, date));

    ReleaseContext {
        commits,
        bumps,
        failures: outcome.failures,
        changelog,
    }
}

/// Fetch `from..to` through `executor` and plan the release.
pub async fn prepare_release(
    executor: Arc<dyn GitExecutor>,
    from: &str,
    to: &str,
    config: &ReleaseConfig,
    loader: &dyn ManifestLoader,
    date: NaiveDate,
) -> Result<ReleaseContext, ReleaseError> {
    let commits = fetch_commits(executor, from, to).await?;
    info!("Found {} commits in {}..{}", commits.len(), from, to);

    Ok(plan_release(commits, config, loader, date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionLabels;
    use crate::git::CommitType;
    use crate::package::{Manifest, PackageId};
    use chrono::Utc;
    use indexmap::IndexMap;
    use std::collections::HashMap;

    fn config(scan: &[&str]) -> ReleaseConfig {
        ReleaseConfig {
            scan: scan.iter().map(|s| s.to_string()).collect(),
            repository: "acme/mono".to_string(),
            pull_request: SectionLabels::default(),
        }
    }

    fn commit(commit_type: CommitType, files: &[&str]) -> Commit {
        Commit {
            hash: "abcdef0123456789".to_string(),
            timestamp: Utc::now(),
            commit_type,
            scope: None,
            breaking: false,
            message: "change".to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_plan_release_without_commits_is_noop() {
        let manifests: HashMap<PackageId, Manifest> = HashMap::new();
        let config = config(&["packages"]);

        let context = plan_release(vec![], &config, &manifests, date());

        assert!(context.is_noop());
        assert!(!context.has_failures());
        assert_eq!(
            context.changelog,
            format!("{}\n---\n", SectionLabels::default().header)
        );
    }

    #[test]
    fn test_plan_release_without_scan_roots_is_noop() {
        let mut manifests = HashMap::new();
        manifests.insert(
            PackageId::new("packages/a"),
            Manifest {
                name: "a".to_string(),
                version: "1.0.0".to_string(),
                dependencies: IndexMap::new(),
            },
        );
        let config = config(&[]);

        let commits = vec![commit(CommitType::Feat, &["packages/a/index.ts"])];
        let context = plan_release(commits, &config, &manifests, date());

        assert!(context.is_noop());
        assert_eq!(context.commits.len(), 1);
    }

    #[test]
    fn test_plan_release_records_failures_separately() {
        let mut manifests = HashMap::new();
        manifests.insert(
            PackageId::new("packages/a"),
            Manifest {
                name: "a".to_string(),
                version: "1.0.0".to_string(),
                dependencies: IndexMap::new(),
            },
        );
        let config = config(&["packages"]);

        let commits = vec![commit(
            CommitType::Fix,
            &["packages/a/index.ts", "packages/gone/index.ts"],
        )];
        let context = plan_release(commits, &config, &manifests, date());

        assert_eq!(context.bumps.len(), 1);
        assert!(context.has_failures());
        assert_eq!(context.failures[0].package(), "packages/gone");
        assert!(context.changelog.contains("<details><summary>packages/a: 1.0.1</summary>"));
        assert!(!context.changelog.contains("packages/gone"));
    }
}
