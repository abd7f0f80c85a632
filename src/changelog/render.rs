//! Markdown rendering of a release.
//!
//! Rendering is pure: the same [`BumpSet`] (including its order), labels,
//! repository and date always produce the same bytes.

use chrono::NaiveDate;

use crate::config::SectionLabels;
use crate::git::{Commit, CommitType};
use crate::version::{Bump, BumpLevel, BumpSet};

/// Length of the abbreviated hash shown in commit links.
const SHORT_HASH_LEN: usize = 7;

/// Commit groups in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitGroup {
    Features,
    Fixes,
    Docs,
    Other,
}

impl CommitGroup {
    pub const ALL: [CommitGroup; 4] = [Self::Features, Self::Fixes, Self::Docs, Self::Other];

    pub fn of(commit_type: &CommitType) -> Self {
        match commit_type {
            CommitType::Feat => Self::Features,
            CommitType::Fix => Self::Fixes,
            CommitType::Docs => Self::Docs,
            _ => Self::Other,
        }
    }

    fn label<'a>(&self, labels: &'a SectionLabels) -> &'a str {
        match self {
            Self::Features => &labels.feat,
            Self::Fixes => &labels.fix,
            Self::Docs => &labels.docs,
            Self::Other => &labels.other,
        }
    }
}

/// Everything besides the bumps that shapes the rendered text.
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub labels: &'a SectionLabels,
    /// GitHub `owner/name`.
    pub repository: &'a str,
    pub date: NaiveDate,
}

/// Render the aggregate changelog / PR body for all bumps.
///
/// An empty set renders only the header.
pub fn render_changelog(bumps: &BumpSet, options: &RenderOptions<'_>) -> String {
    let mut out = format!("{}\n---\n", options.labels.header);

    for bump in bumps {
        out.push_str(&format!(
            "<details><summary>{}: {}</summary>\n\n",
            bump.package, bump.new_version
        ));
        out.push_str(&render_package_section(bump, options));
        out.push_str("</details>\n\n");
    }

    out
}

/// Render one package's section, from the version heading to the dependency list.
pub fn render_package_section(bump: &Bump, options: &RenderOptions<'_>) -> String {
    let mut out = String::new();
    let repo = options.repository;

    out.push_str(&format!(
        "## [{new}](https://github.com/{repo}/compare/{pkg}-v{current}...{pkg}@{new}) ({date})\n\n",
        new = bump.new_version,
        repo = repo,
        pkg = bump.package,
        current = bump.current_version,
        date = options.date.format("%Y-%m-%d"),
    ));

    for group in CommitGroup::ALL {
        let commits: Vec<&Commit> = bump
            .commits
            .iter()
            .filter(|c| CommitGroup::of(&c.commit_type) == group)
            .collect();
        if commits.is_empty() {
            continue;
        }

        out.push_str(&format!("{}\n\n", group.label(options.labels)));
        for commit in commits {
            out.push_str(&format!(
                "* {} ([{}](https://github.com/{}/commit/{}))\n",
                commit.message,
                short_hash(&commit.hash),
                repo,
                commit.hash
            ));
        }
        out.push('\n');
    }

    if !bump.dependency_range_updates.is_empty() {
        out.push_str(&format!("{}\n\n", options.labels.dependencies));
        out.push_str("* The following workspace dependencies were updated\n");
        for (dep, new_range) in &bump.dependency_range_updates {
            let old_range = bump
                .manifest
                .dependencies
                .get(dep)
                .map(String::as_str)
                .unwrap_or_default();
            out.push_str(&format!(
                "    * {} bumped from {} to {}\n",
                dep, old_range, new_range
            ));
        }
    }

    out
}

/// One-line summary of a release for console output.
pub fn summarize(bumps: &BumpSet) -> String {
    if bumps.is_empty() {
        return "No packages changed. Nothing to release.".to_string();
    }

    let count = |level: BumpLevel| bumps.iter().filter(|b| b.level == level).count();
    let details: Vec<String> = [BumpLevel::Major, BumpLevel::Minor, BumpLevel::Patch]
        .into_iter()
        .map(|level| (level, count(level)))
        .filter(|(_, n)| *n > 0)
        .map(|(level, n)| format!("{}: {}", level, n))
        .collect();

    let noun = if bumps.len() == 1 {
        "package release"
    } else {
        "package releases"
    };

    format!("Prepared {} {} ({})", bumps.len(), noun, details.join(", "))
}

fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}
