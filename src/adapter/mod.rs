//! Read-only filesystem view of a GitHub repository.
//!
//! [`GithubFs`] answers filesystem queries by calling the remote
//! capabilities in [`crate::github`]. It keeps no state besides the
//! repository reference, so every query goes back to the remote.

mod exists;
mod listing;
mod metadata;
mod read;
mod timestamp;

#[cfg(test)]
mod testing;

use std::io::Read;
use std::sync::Arc;

pub use listing::Listing;

use crate::filesystem::{
    FileEntry, FsError, ReadFilesystem, Visibility, WriteFilesystem, WriteOptions,
};
use crate::github::{CommitsService, ContentsService, Description, TreeService};
use crate::types::RepoRef;

/// Revision used by deep listings when the reference has none.
///
/// Shallow operations leave the revision unset and let the remote pick its
/// default branch instead.
pub const DEFAULT_TREE_REVISION: &str = "main";

pub struct GithubFs {
    repo: RepoRef,
    contents: Arc<dyn ContentsService>,
    trees: Arc<dyn TreeService>,
    commits: Arc<dyn CommitsService>,
}

impl GithubFs {
    pub fn new(
        repo: RepoRef,
        contents: Arc<dyn ContentsService>,
        trees: Arc<dyn TreeService>,
        commits: Arc<dyn CommitsService>,
    ) -> Self {
        Self {
            repo,
            contents,
            trees,
            commits,
        }
    }

    /// Wires every capability to the same backend.
    pub fn with_services<S>(repo: RepoRef, services: Arc<S>) -> Self
    where
        S: ContentsService + TreeService + CommitsService + 'static,
    {
        Self::new(repo, services.clone(), services.clone(), services)
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn probe(&self, path: &str) -> Result<bool, FsError> {
        log::debug!("exists {}:{}", self.repo, path);
        self.contents
            .exists(&self.repo, path)
            .map_err(|source| FsError::Service {
                path: path.to_string(),
                source,
            })
    }

    fn describe(&self, path: &str) -> Result<Description, FsError> {
        log::debug!("describe {}:{}", self.repo, path);
        self.contents
            .describe(&self.repo, path)
            .map_err(|source| FsError::Service {
                path: path.to_string(),
                source,
            })
    }
}

fn is_root(path: &str) -> bool {
    matches!(path, "" | "/")
}

/// `file` (contents API) and `blob` (tree API) are files; anything else,
/// including a missing type, is a directory.
fn is_file_kind(kind: Option<&str>) -> bool {
    matches!(kind, Some("file" | "blob"))
}

impl ReadFilesystem for GithubFs {
    type Listing = Listing;

    fn file_exists(&self, path: &str) -> Result<bool, FsError> {
        self.check_file(path)
    }

    fn directory_exists(&self, path: &str) -> Result<bool, FsError> {
        self.check_directory(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        self.fetch_bytes(path)
    }

    fn visibility(&self, path: &str) -> Result<FileEntry, FsError> {
        self.file_metadata(path)
    }

    fn mime_type(&self, path: &str) -> Result<FileEntry, FsError> {
        self.file_metadata(path)
    }

    fn last_modified(&self, path: &str) -> Result<FileEntry, FsError> {
        self.file_metadata(path)
    }

    fn file_size(&self, path: &str) -> Result<FileEntry, FsError> {
        self.file_metadata(path)
    }

    fn list_contents(&self, path: &str, deep: bool) -> Result<Listing, FsError> {
        self.listing(path, deep)
    }
}

fn unsupported(operation: &'static str, path: &str) -> Result<(), FsError> {
    Err(FsError::Unsupported {
        operation,
        path: path.to_string(),
    })
}

impl WriteFilesystem for GithubFs {
    fn write(&self, path: &str, _contents: &[u8], _options: &WriteOptions) -> Result<(), FsError> {
        unsupported("write", path)
    }

    fn write_stream(
        &self,
        path: &str,
        _contents: &mut dyn Read,
        _options: &WriteOptions,
    ) -> Result<(), FsError> {
        unsupported("write_stream", path)
    }

    fn delete(&self, path: &str) -> Result<(), FsError> {
        unsupported("delete", path)
    }

    fn delete_directory(&self, path: &str) -> Result<(), FsError> {
        unsupported("delete_directory", path)
    }

    fn create_directory(&self, path: &str, _options: &WriteOptions) -> Result<(), FsError> {
        unsupported("create_directory", path)
    }

    fn set_visibility(&self, path: &str, _visibility: Visibility) -> Result<(), FsError> {
        unsupported("set_visibility", path)
    }

    fn move_file(
        &self,
        source: &str,
        _destination: &str,
        _options: &WriteOptions,
    ) -> Result<(), FsError> {
        unsupported("move", source)
    }

    fn copy_file(
        &self,
        source: &str,
        _destination: &str,
        _options: &WriteOptions,
    ) -> Result<(), FsError> {
        unsupported("copy", source)
    }
}
