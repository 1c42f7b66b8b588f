//! Scripted remote that records every call, for exact call-pattern assertions.

use std::sync::Mutex;

use crate::github::{
    CommitQuery, CommitsService, ContentsService, Description, RawCommit, RawItem, ServiceError,
    Tree, TreeService,
};
use crate::types::RepoRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists {
        path: String,
        revision: Option<String>,
    },
    Describe {
        path: String,
        revision: Option<String>,
    },
    Tree {
        revision: String,
    },
    Commits(CommitQuery),
}

#[derive(Default)]
pub struct ScriptedRemote {
    repo: Option<RepoRef>,
    exists: bool,
    description: Option<Description>,
    tree: Vec<RawItem>,
    commits: Vec<RawCommit>,
    fail_exists: bool,
    fail_tree: bool,
    fail_commits: bool,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, repo: &str) -> Self {
        self.repo = Some(repo.parse().unwrap());
        self
    }

    pub fn exists(mut self, exists: bool) -> Self {
        self.exists = exists;
        self
    }

    pub fn describe(mut self, description: Description) -> Self {
        self.description = Some(description);
        self
    }

    pub fn tree(mut self, items: Vec<RawItem>) -> Self {
        self.tree = items;
        self
    }

    pub fn commits(mut self, commits: Vec<RawCommit>) -> Self {
        self.commits = commits;
        self
    }

    pub fn failing_exists(mut self) -> Self {
        self.fail_exists = true;
        self
    }

    pub fn failing_tree(mut self) -> Self {
        self.fail_tree = true;
        self
    }

    pub fn failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    /// The reference the adapter under test should be built with.
    pub fn repo_ref(&self) -> RepoRef {
        self.repo
            .clone()
            .unwrap_or_else(|| "octocat/scripted@0a1b2c3".parse().unwrap())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rate_limited(url: &str) -> ServiceError {
    ServiceError::Status {
        status: 403,
        url: url.to_string(),
        message: "API rate limit exceeded".to_string(),
    }
}

impl ContentsService for ScriptedRemote {
    fn exists(&self, repo: &RepoRef, path: &str) -> Result<bool, ServiceError> {
        self.record(Call::Exists {
            path: path.to_string(),
            revision: repo.revision_str().map(str::to_string),
        });
        if self.fail_exists {
            return Err(rate_limited("contents"));
        }
        Ok(self.exists)
    }

    fn describe(&self, repo: &RepoRef, path: &str) -> Result<Description, ServiceError> {
        self.record(Call::Describe {
            path: path.to_string(),
            revision: repo.revision_str().map(str::to_string),
        });
        self.description
            .clone()
            .ok_or_else(|| ServiceError::NotFound(path.to_string()))
    }
}

impl TreeService for ScriptedRemote {
    fn describe_recursive(&self, _repo: &RepoRef, revision: &str) -> Result<Tree, ServiceError> {
        self.record(Call::Tree {
            revision: revision.to_string(),
        });
        if self.fail_tree {
            return Err(rate_limited("git/trees"));
        }
        Ok(Tree {
            sha: None,
            tree: self.tree.clone(),
            truncated: false,
        })
    }
}

impl CommitsService for ScriptedRemote {
    fn list(&self, _repo: &RepoRef, query: &CommitQuery) -> Result<Vec<RawCommit>, ServiceError> {
        self.record(Call::Commits(query.clone()));
        if self.fail_commits {
            return Err(rate_limited("commits"));
        }
        Ok(self.commits.clone())
    }
}
