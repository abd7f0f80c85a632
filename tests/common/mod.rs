//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Signature};
use indexmap::IndexMap;
use monorel::git::{Commit, CommitType};
use monorel::package::{MANIFEST_FILE_NAME, Manifest, PackageId};

/// Build a commit touching `files`.
pub fn make_commit(commit_type: CommitType, breaking: bool, message: &str, files: &[&str]) -> Commit {
    Commit {
        hash: format!("{:0>40}", message.len()),
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        commit_type,
        scope: None,
        breaking,
        message: message.to_string(),
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

/// Build a manifest with dependencies in the given order.
pub fn make_manifest(name: &str, version: &str, dependencies: &[(&str, &str)]) -> Manifest {
    Manifest {
        name: name.to_string(),
        version: version.to_string(),
        dependencies: dependencies
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect::<IndexMap<_, _>>(),
    }
}

/// In-memory manifest store from `(package id, manifest)` pairs.
pub fn manifests(entries: Vec<(&str, Manifest)>) -> HashMap<PackageId, Manifest> {
    entries
        .into_iter()
        .map(|(id, manifest)| (PackageId::new(id), manifest))
        .collect()
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `<root>/<id>/package.json` with raw JSON content.
pub fn write_package_json(root: &Path, id: &str, json: &str) {
    let dir = root.join(id);
    std::fs::create_dir_all(&dir).expect("Failed to create package directory");
    std::fs::write(dir.join(MANIFEST_FILE_NAME), json).expect("Failed to write package.json");
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write `files` (path relative to the repository root, content), stage
    /// them and commit with `message`. Returns the commit OID.
    pub fn commit(&self, message: &str, files: &[(&str, &str)]) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create directory");
            }
            std::fs::write(&full, content).expect("Failed to write file");
            index.add_path(Path::new(path)).expect("Failed to add file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = self.signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }
}
