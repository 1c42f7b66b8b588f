use chrono::DateTime;

use super::GithubFs;
use crate::filesystem::FsError;
use crate::github::CommitQuery;

/// Parses an ISO 8601 committer date (`2024-01-31T17:04:05Z`) into seconds
/// since the epoch.
pub(crate) fn parse_committer_date(date: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(date.trim())
        .ok()
        .map(|dt| dt.timestamp())
}

impl GithubFs {
    /// Last-modified time of `path`: the committer date of the newest commit
    /// touching it, or 0 when there is none or it cannot be parsed.
    ///
    /// Errors only when the commit history request itself fails.
    pub fn resolve_timestamp(&self, path: &str) -> Result<i64, FsError> {
        let query = CommitQuery {
            page: 1,
            per_page: 1,
            path: path.to_string(),
            revision: self.repo.revision_str().map(str::to_string),
        };

        log::debug!("commits {}:{}", self.repo, path);
        let commits = self
            .commits
            .list(&self.repo, &query)
            .map_err(|source| FsError::Service {
                path: path.to_string(),
                source,
            })?;

        let Some(date) = commits.first().and_then(|c| c.committer_date()) else {
            return Ok(0);
        };

        Ok(parse_committer_date(date).unwrap_or_else(|| {
            log::warn!("Unparseable committer date '{}' for {}", date, path);
            0
        }))
    }
}
