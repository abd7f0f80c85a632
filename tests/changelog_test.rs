//! Integration tests for changelog rendering and package changelog files.

mod common;

use chrono::NaiveDate;
use common::{make_commit, make_manifest, manifests, temp_test_dir};
use monorel::changelog::{
    CHANGELOG_HEADER, ChangelogWrite, RenderOptions, prepend_section, render_changelog,
    render_package_section, summarize,
};
use monorel::config::SectionLabels;
use monorel::git::{Commit, CommitType};
use monorel::package::PackageId;
use monorel::version::{BumpSet, calculate_bumps, propagate_dependency_ranges};

fn commit_with_hash(hash: &str, commit_type: CommitType, message: &str, files: &[&str]) -> Commit {
    let mut commit = make_commit(commit_type, false, message, files);
    commit.hash = hash.to_string();
    commit
}

fn two_package_release() -> BumpSet {
    let commits = vec![
        commit_with_hash("aaaaaaaaaaaa", CommitType::Feat, "add widget", &["packages/a/src/w.ts"]),
        commit_with_hash("bbbbbbbbbbbb", CommitType::Fix, "handle null", &["packages/b/src/n.ts"]),
    ];
    let store = manifests(vec![
        ("packages/a", make_manifest("a", "1.0.0", &[])),
        ("packages/b", make_manifest("b", "2.0.0", &[("a", "^1.0.0")])),
    ]);
    let packages = vec![PackageId::new("packages/a"), PackageId::new("packages/b")];

    let outcome = calculate_bumps(BumpSet::new(), &packages, &commits, &store);
    propagate_dependency_ranges(outcome.bumps)
}

fn options(labels: &SectionLabels) -> RenderOptions<'_> {
    RenderOptions {
        labels,
        repository: "acme/mono",
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
    }
}

#[test]
fn test_full_changelog_output() {
    let labels = SectionLabels::default();
    let bumps = two_package_release();

    let rendered = render_changelog(&bumps, &options(&labels));

    let expected = concat!(
        ":robot: I have created a release *beep* *boop*\n",
        "---\n",
        "<details><summary>packages/a: 1.1.0</summary>\n",
        "\n",
        "## [1.1.0](https://github.com/acme/mono/compare/packages/a-v1.0.0...packages/a@1.1.0) (2024-03-09)\n",
        "\n",
        "### Features\n",
        "\n",
        "* add widget ([aaaaaaa](https://github.com/acme/mono/commit/aaaaaaaaaaaa))\n",
        "\n",
        "</details>\n",
        "\n",
        "<details><summary>packages/b: 2.0.1</summary>\n",
        "\n",
        "## [2.0.1](https://github.com/acme/mono/compare/packages/b-v2.0.0...packages/b@2.0.1) (2024-03-09)\n",
        "\n",
        "### Bug Fixes\n",
        "\n",
        "* handle null ([bbbbbbb](https://github.com/acme/mono/commit/bbbbbbbbbbbb))\n",
        "\n",
        "### Dependencies\n",
        "\n",
        "* The following workspace dependencies were updated\n",
        "    * a bumped from ^1.0.0 to ^1.1.0\n",
        "</details>\n",
        "\n",
    );
    assert_eq!(rendered, expected);
}

#[test]
fn test_rendering_is_deterministic() {
    let labels = SectionLabels::default();
    let bumps = two_package_release();

    let first = render_changelog(&bumps, &options(&labels));
    let second = render_changelog(&bumps.clone(), &options(&labels));

    assert_eq!(first, second);
}

#[test]
fn test_custom_labels() {
    let labels = SectionLabels {
        header: "Release time".to_string(),
        feat: "## Added".to_string(),
        ..SectionLabels::default()
    };
    let bumps = two_package_release();

    let rendered = render_changelog(&bumps, &options(&labels));

    assert!(rendered.starts_with("Release time\n---\n"));
    assert!(rendered.contains("## Added\n\n* add widget"));
    assert!(!rendered.contains("### Features"));
}

#[test]
fn test_no_affected_packages_renders_header_only() {
    let labels = SectionLabels::default();
    let commits = vec![make_commit(CommitType::Feat, false, "root", &["README.md"])];
    let store = manifests(vec![]);

    let outcome = calculate_bumps(BumpSet::new(), &[], &commits, &store);
    let rendered = render_changelog(&outcome.bumps, &options(&labels));

    assert!(outcome.bumps.is_empty());
    assert_eq!(rendered, format!("{}\n---\n", labels.header));
    assert_eq!(summarize(&outcome.bumps), "No packages changed. Nothing to release.");
}

#[test]
fn test_summary_counts_levels() {
    let bumps = two_package_release();
    assert_eq!(summarize(&bumps), "Prepared 2 package releases (minor: 1, patch: 1)");
}

#[test]
fn test_package_section_prepended_to_existing_changelog() {
    let labels = SectionLabels::default();
    let bumps = two_package_release();
    let bump = bumps.get(&PackageId::new("packages/a")).unwrap();
    let section = render_package_section(bump, &options(&labels));

    let dir = temp_test_dir();
    let path = dir.path().join("CHANGELOG.md");
    std::fs::write(
        &path,
        format!("{}## [1.0.0](https://x) (2024-01-01)\n\n* first\n", CHANGELOG_HEADER),
    )
    .unwrap();

    let result = prepend_section(&path, &bump.new_version, &section).unwrap();
    assert_eq!(result, ChangelogWrite::Written);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Changelog\n\n## [1.1.0]"));
    assert!(content.contains("aaaaaaaaaaaa))\n\n## [1.0.0]"));
    assert!(content.ends_with("* first\n"));

    let again = prepend_section(&path, &bump.new_version, &section).unwrap();
    assert_eq!(again, ChangelogWrite::AlreadyPresent);
}
