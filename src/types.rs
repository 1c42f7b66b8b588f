//! Repository addressing types

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("value cannot be empty")]
    Empty,
    #[error("invalid character in value: {0}")]
    InvalidCharacter(char),
    #[error("value cannot start with '{0}'")]
    InvalidStart(char),
    #[error("value cannot end with '{0}'")]
    InvalidEnd(char),
    #[error("missing separator '/' in repository reference")]
    MissingSeparator,
    #[error("invalid owner: {0}")]
    InvalidOwner(#[source] Box<ParseError>),
    #[error("invalid repo: {0}")]
    InvalidRepo(#[source] Box<ParseError>),
    #[error("invalid revision: {0}")]
    InvalidRevision(#[source] Box<ParseError>),
}

/// A GitHub owner (user or organization)
///
/// Non-empty, ASCII alphanumerics and hyphens, no leading or trailing hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner(String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Owner {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if s.starts_with('-') {
            return Err(ParseError::InvalidStart('-'));
        }
        if s.ends_with('-') {
            return Err(ParseError::InvalidEnd('-'));
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(ParseError::InvalidCharacter(c));
        }

        Ok(Owner(s.to_string()))
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A GitHub repository name
///
/// Non-empty, ASCII alphanumerics plus `-`, `_` and `.`, not starting with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo(String);

impl Repo {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Repo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if s.starts_with('.') {
            return Err(ParseError::InvalidStart('.'));
        }
        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
        {
            return Err(ParseError::InvalidCharacter(c));
        }

        Ok(Repo(s.to_string()))
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A branch name, tag, or commit sha.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Revision {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(ParseError::InvalidCharacter(c));
        }

        Ok(Revision(s.to_string()))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A repository at an optional revision.
///
/// With no revision the remote picks its default branch. Parses from
/// `owner/repo` or `owner/repo@revision`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: Owner,
    pub repo: Repo,
    pub revision: Option<Revision>,
}

impl RepoRef {
    pub fn new(owner: Owner, repo: Repo, revision: Option<Revision>) -> Self {
        Self {
            owner,
            repo,
            revision,
        }
    }

    /// The revision as passed to remote calls, if one was configured.
    pub fn revision_str(&self) -> Option<&str> {
        self.revision.as_ref().map(Revision::as_str)
    }
}

impl FromStr for RepoRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, revision) = match s.split_once('@') {
            Some((key, rev)) => (
                key,
                Some(
                    rev.parse::<Revision>()
                        .map_err(|e| ParseError::InvalidRevision(Box::new(e)))?,
                ),
            ),
            None => (s, None),
        };

        let (owner_str, repo_str) = key.split_once('/').ok_or(ParseError::MissingSeparator)?;

        let owner = owner_str
            .parse::<Owner>()
            .map_err(|e| ParseError::InvalidOwner(Box::new(e)))?;
        let repo = repo_str
            .parse::<Repo>()
            .map_err(|e| ParseError::InvalidRepo(Box::new(e)))?;

        Ok(RepoRef::new(owner, repo, revision))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(rev) = &self.revision {
            write!(f, "@{}", rev)?;
        }
        Ok(())
    }
}
