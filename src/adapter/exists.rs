use super::{GithubFs, is_root};
use crate::filesystem::FsError;
use crate::github::Description;

impl GithubFs {
    /// Probes first so a missing path costs a single call.
    fn describe_if_exists(&self, path: &str) -> Result<Option<Description>, FsError> {
        if !self.probe(path)? {
            return Ok(None);
        }
        self.describe(path).map(Some)
    }

    pub(super) fn check_file(&self, path: &str) -> Result<bool, FsError> {
        if is_root(path) {
            return Ok(false);
        }

        Ok(match self.describe_if_exists(path)? {
            Some(Description::File(file)) => file.kind.as_deref() == Some("file"),
            Some(Description::Directory(_)) | None => false,
        })
    }

    pub(super) fn check_directory(&self, path: &str) -> Result<bool, FsError> {
        if is_root(path) {
            return Ok(true);
        }

        Ok(matches!(
            self.describe_if_exists(path)?,
            Some(Description::Directory(_))
        ))
    }
}
