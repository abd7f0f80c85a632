//! Commit retrieval and classification.

pub mod commits;
pub mod executor;

pub use commits::{Commit, CommitType, LogEntry, Subject, classify, parse_log, parse_log_line, parse_subject};
pub use executor::{GitExecutor, GitRepo, fetch_commits};
