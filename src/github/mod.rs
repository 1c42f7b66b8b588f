//! Remote capabilities consumed by the filesystem adapter.
//!
//! Each capability is its own trait so the adapter can be wired to the
//! GitHub REST client, to [`MemoryRepository`], or to any mix of the two.

mod client;
mod memory;

pub use client::GithubClient;
pub use memory::{CallCounts, MemoryRepository};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RepoRef;

/// Failure talking to the remote.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path not found: {0}")]
    NotFound(String),
}

/// One node of a listing, as delivered by the contents or tree endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl RawItem {
    pub fn new(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: Some(kind.into()),
            size: None,
        }
    }
}

/// Description of a single path that is not a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// Base64 payload, possibly wrapped across lines.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Result of a describe call.
///
/// The contents endpoint answers with a JSON array for directories and a
/// JSON object for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Directory(Vec<RawItem>),
    File(RawFile),
}

/// Response of a recursive tree call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub tree: Vec<RawItem>,
    /// Set by the remote when the tree exceeded its response limit.
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub committer: Option<Signature>,
}

/// One entry of a commit history listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub commit: CommitDetail,
}

impl RawCommit {
    pub fn with_committer_date(date: impl Into<String>) -> Self {
        Self {
            sha: None,
            commit: CommitDetail {
                committer: Some(Signature {
                    date: Some(date.into()),
                }),
            },
        }
    }

    pub fn committer_date(&self) -> Option<&str> {
        self.commit
            .committer
            .as_ref()
            .and_then(|c| c.date.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// Filter for a commit history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    pub page: u32,
    pub per_page: u32,
    pub path: String,
    pub revision: Option<String>,
}

/// Path-addressed, single-level browsing.
pub trait ContentsService: Send + Sync {
    /// Cheap presence check for `path` at the reference's revision.
    fn exists(&self, repo: &RepoRef, path: &str) -> Result<bool, ServiceError>;

    /// Full description of `path`: file metadata and content, or the
    /// immediate children of a directory.
    fn describe(&self, repo: &RepoRef, path: &str) -> Result<Description, ServiceError>;
}

/// Recursive listing of a whole revision.
pub trait TreeService: Send + Sync {
    fn describe_recursive(&self, repo: &RepoRef, revision: &str) -> Result<Tree, ServiceError>;
}

/// Commit history, newest first.
pub trait CommitsService: Send + Sync {
    fn list(&self, repo: &RepoRef, query: &CommitQuery) -> Result<Vec<RawCommit>, ServiceError>;
}
