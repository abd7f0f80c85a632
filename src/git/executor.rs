//! Repository reads and concurrent touched-file retrieval.
//!
//! Git is read through libgit2. Each read opens its own [`Repository`] on a
//! blocking thread, so touched-file lists for many commits can be computed in
//! parallel.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use git2::{Oid, Repository, Sort};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::GitError;

use super::commits::{Commit, classify, parse_log};

/// Default number of commits diffed concurrently.
const DEFAULT_CONCURRENCY: usize = 8;

/// Environment variable to override the default concurrency.
const CONCURRENCY_ENV_VAR: &str = "MONOREL_GIT_CONCURRENCY";

/// Read the configured concurrency for touched-file retrieval.
///
/// Falls back to the default with a warning when the variable is set but not
/// a positive integer.
fn get_concurrency() -> usize {
    match env::var(CONCURRENCY_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}",
                    CONCURRENCY_ENV_VAR, v, DEFAULT_CONCURRENCY
                );
                DEFAULT_CONCURRENCY
            }
        },
        _ => DEFAULT_CONCURRENCY,
    }
}

/// Source-control reads needed by a release run.
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Raw `<hash> <unix-seconds> <subject>` lines for `from..to`, newest first.
    async fn log(&self, from: &str, to: &str) -> Result<String, GitError>;

    /// Repository-relative paths touched by one commit.
    async fn touched_files(&self, hash: &str) -> Result<Vec<String>, GitError>;
}

/// Executor backed by a local repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    git_dir: PathBuf,
}

impl GitRepo {
    /// Discover the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path.as_ref()).map_err(GitError::OpenRepository)?;
        Ok(Self {
            git_dir: repo.path().to_path_buf(),
        })
    }

    /// Run `read` against a freshly opened repository on a blocking thread.
    async fn with_repo<T, F>(&self, read: F) -> Result<T, GitError>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T, GitError> + Send + 'static,
    {
        let git_dir = self.git_dir.clone();
        tokio::task::spawn_blocking(move || {
            let repo = Repository::open(&git_dir).map_err(GitError::OpenRepository)?;
            read(&repo)
        })
        .await
        .map_err(GitError::TaskFailed)?
    }
}

#[async_trait]
impl GitExecutor for GitRepo {
    async fn log(&self, from: &str, to: &str) -> Result<String, GitError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.with_repo(move |repo| walk_log(repo, &from, &to)).await
    }

    async fn touched_files(&self, hash: &str) -> Result<Vec<String>, GitError> {
        let hash = hash.to_string();
        self.with_repo(move |repo| diff_commit(repo, &hash)).await
    }
}

/// Resolve a reference (tag, branch, commit hash) to a commit OID.
fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    let object = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    let commit = object.peel_to_commit().map_err(GitError::ParseCommit)?;
    Ok(commit.id())
}

/// Log lines for commits reachable from `to` but not from `from`.
fn walk_log(repo: &Repository, from: &str, to: &str) -> Result<String, GitError> {
    let to_oid = resolve_reference(repo, to)?;
    let from_oid = resolve_reference(repo, from)?;

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(to_oid).map_err(GitError::RevwalkError)?;
    revwalk.hide(from_oid).map_err(GitError::RevwalkError)?;

    let mut log = String::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        log.push_str(&format!(
            "{} {} {}\n",
            oid,
            commit.time().seconds(),
            commit.summary().unwrap_or_default()
        ));
    }

    Ok(log)
}

/// Paths changed by `hash` relative to its first parent, or to the empty
/// tree for a root commit.
fn diff_commit(repo: &Repository, hash: &str) -> Result<Vec<String>, GitError> {
    let oid = Oid::from_str(hash).map_err(|e| GitError::ReferenceNotFound(hash.to_string(), e))?;
    let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
    let tree = commit.tree().map_err(GitError::ParseCommit)?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit.parent(0).map_err(GitError::ParseCommit)?;
        Some(parent.tree().map_err(GitError::ParseCommit)?)
    } else {
        None
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(|e| GitError::DiffFailed(hash.to_string(), e))?;

    Ok(diff
        .deltas()
        .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
        .map(|path| path.to_string_lossy().into_owned())
        .collect())
}

/// Fetch and classify every commit in `from..to`.
///
/// Touched-file lists are fetched concurrently; results are keyed by hash and
/// assembled in log order, so completion order never affects the output.
pub async fn fetch_commits(
    executor: Arc<dyn GitExecutor>,
    from: &str,
    to: &str,
) -> Result<Vec<Commit>, GitError> {
    let log = executor.log(from, to).await?;
    let entries = parse_log(&log);
    debug!(count = entries.len(), "Parsed commit log");

    let permits = Arc::new(Semaphore::new(get_concurrency()));
    let mut tasks = JoinSet::new();

    for entry in &entries {
        let executor = Arc::clone(&executor);
        let permits = Arc::clone(&permits);
        let hash = entry.hash.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let files = executor.touched_files(&hash).await;
            (hash, files)
        });
    }

    let mut files_by_hash: HashMap<String, Vec<String>> = HashMap::with_capacity(entries.len());
    while let Some(joined) = tasks.join_next().await {
        let (hash, files) = joined.map_err(GitError::TaskFailed)?;
        files_by_hash.insert(hash, files?);
    }

    Ok(entries
        .iter()
        .map(|entry| {
            let files = files_by_hash.remove(&entry.hash).unwrap_or_default();
            classify(entry, files)
        })
        .collect())
}
