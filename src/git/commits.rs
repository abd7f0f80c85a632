//! Log line parsing and conventional commit classification.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Conventional commit types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
    /// A well-formed type token outside the conventional set (e.g. `deps`).
    Custom(String),
    /// The subject carried no conventional header at all.
    Other,
}

impl CommitType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Perf => "perf",
            Self::Test => "test",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Chore => "chore",
            Self::Revert => "revert",
            Self::Custom(token) => token,
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CommitType {
    fn from(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "feat" => Self::Feat,
            "fix" => Self::Fix,
            "docs" => Self::Docs,
            "style" => Self::Style,
            "refactor" => Self::Refactor,
            "perf" => Self::Perf,
            "test" => Self::Test,
            "build" => Self::Build,
            "ci" => Self::Ci,
            "chore" => Self::Chore,
            "revert" => Self::Revert,
            "" | "other" => Self::Other,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl Serialize for CommitType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CommitType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// One commit in the release window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub breaking: bool,
    pub message: String,
    pub files: Vec<String>,
}

impl Commit {
    /// Whether any touched file lies under `root` on a path-segment boundary.
    pub fn touches(&self, root: &str) -> bool {
        self.files.iter().any(|file| is_under(file, root))
    }
}

/// A log line split into its fields, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
}

/// Conventional header parts extracted from a subject line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub breaking: bool,
    pub message: String,
}

// type(scope)! with nothing else before the first colon
static HEADER_RE: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^\s*([\w-]+)(?:\(([^)]*)\))?(!)?\s*$")
        .expect("conventional header pattern is valid")
});

/// Parse a subject line into its conventional parts.
///
/// The subject is split at the first `:`. When there is no colon, or the text
/// before it is not a conventional header, the commit is classified as
/// [`CommitType::Other`] and the whole subject becomes the message.
pub fn parse_subject(subject: &str) -> Subject {
    let fallback = || Subject {
        commit_type: CommitType::Other,
        scope: None,
        breaking: false,
        message: subject.trim().to_string(),
    };

    let Some((header, body)) = subject.split_once(':') else {
        return fallback();
    };
    let Some(caps) = HEADER_RE.captures(header) else {
        return fallback();
    };

    let commit_type = caps
        .get(1)
        .map(|m| CommitType::from(m.as_str()))
        .unwrap_or(CommitType::Other);
    let scope = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    Subject {
        commit_type,
        scope,
        breaking: caps.get(3).is_some(),
        message: body.trim().to_string(),
    }
}

/// Split a `<hash> <unix-seconds> <subject>` line.
///
/// Returns `None` for blank lines. Missing or malformed fields are tolerated.
pub fn parse_log_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.splitn(3, ' ');
    let hash = parts.next().unwrap_or_default().to_string();
    let raw_timestamp = parts.next().unwrap_or_default();
    let subject = parts.next().unwrap_or_default().to_string();

    let timestamp = raw_timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(|| {
            warn!(%hash, raw_timestamp, "Invalid commit timestamp, using epoch");
            DateTime::<Utc>::UNIX_EPOCH
        });

    Some(LogEntry {
        hash,
        timestamp,
        subject,
    })
}

/// Parse a whole log, one entry per non-empty line, in log order.
pub fn parse_log(log: &str) -> Vec<LogEntry> {
    log.lines().filter_map(parse_log_line).collect()
}

/// Classify a log entry and attach the files it touched.
pub fn classify(entry: &LogEntry, files: Vec<String>) -> Commit {
    let subject = parse_subject(&entry.subject);

    Commit {
        hash: entry.hash.clone(),
        timestamp: entry.timestamp,
        commit_type: subject.commit_type,
        scope: subject.scope,
        breaking: subject.breaking,
        message: subject.message,
        files,
    }
}

/// Whether `path` equals `root` or lies beneath it.
pub(crate) fn is_under(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
