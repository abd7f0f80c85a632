//! Map touched files to the packages they belong to.

use tracing::debug;

use crate::git::Commit;
use crate::git::commits::is_under;

use super::PackageId;

/// Find the packages touched by `commits` under the configured scan roots.
///
/// A package is `root/<child>` where `<child>` is the directory right below
/// the root. Files directly under a root identify no package and are dropped.
/// Keying on the root rather than the first two path segments keeps nested
/// roots such as `libs/js` working, and keeps `packages/README.md` from
/// becoming a package. Identifiers are returned once each, in order of first
/// appearance.
pub fn discover_packages(commits: &[Commit], roots: &[String]) -> Vec<PackageId> {
    let mut packages: Vec<PackageId> = Vec::new();
    let mut scanned = 0usize;

    for file in commits.iter().flat_map(|c| c.files.iter()) {
        let Some(root) = roots.iter().find(|root| is_under(file, root)) else {
            continue;
        };
        scanned += 1;

        match package_for(file, root) {
            Some(id) if !packages.contains(&id) => packages.push(id),
            Some(_) => {}
            None => debug!(file = %file, root = %root, "File identifies no package, skipping"),
        }
    }

    debug!(files = scanned, packages = packages.len(), "Scanned changed files");
    packages
}

/// Derive the package identifier for a file already known to be under `root`.
fn package_for(file: &str, root: &str) -> Option<PackageId> {
    let root = root.trim_end_matches('/');
    let rest = file.strip_prefix(root)?.strip_prefix('/')?;

    // The child must be a directory, so something has to follow it.
    let (child, below) = rest.split_once('/')?;
    if child.is_empty() || below.is_empty() {
        return None;
    }

    Some(PackageId::new(format!("{}/{}", root, child)))
}
