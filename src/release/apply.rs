//! Persisting a planned release to the workspace.

use std::path::PathBuf;

use tracing::info;

use crate::changelog::{CHANGELOG_FILE_NAME, ChangelogWrite, RenderOptions, prepend_section, render_package_section};
use crate::error::ReleaseError;
use crate::package::Workspace;

use super::ReleaseContext;

/// Write every bump in `context` into `workspace`.
///
/// For each package, in release order, the manifest gets the new version and
/// updated dependency ranges, then the package section is prepended to its
/// changelog. Returns the paths written. Stops at the first failure.
///
/// Nothing is rolled back: packages before the failing one stay released on
/// disk, and running again with the same plan finishes the rest without
/// duplicating changelog sections.
pub fn apply_release(
    workspace: &Workspace,
    context: &ReleaseContext,
    options: &RenderOptions<'_>,
) -> Result<Vec<PathBuf>, ReleaseError> {
    let mut written = Vec::new();

    for bump in &context.bumps {
        let manifest_path = workspace.write_release(
            &bump.package,
            &bump.new_version,
            &bump.dependency_range_updates,
        )?;
        written.push(manifest_path);

        let changelog_path = workspace.package_dir(&bump.package).join(CHANGELOG_FILE_NAME);
        let section = render_package_section(bump, options);
        match prepend_section(&changelog_path, &bump.new_version, &section)? {
            ChangelogWrite::Written => written.push(changelog_path),
            ChangelogWrite::AlreadyPresent => {
                info!(
                    "{}: {} already in {}, skipping",
                    bump.name(),
                    bump.new_version,
                    changelog_path.display()
                );
            }
        }

        info!("{}: released {}", bump.name(), bump.new_version);
    }

    Ok(written)
}
