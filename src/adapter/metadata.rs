use super::GithubFs;
use crate::filesystem::{FileEntry, FsError};
use crate::github::{Description, RawFile};

/// Mime type guessed from the extension of `path`, or an empty string.
pub(crate) fn mime_type_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default()
}

impl GithubFs {
    /// Shared by every metadata query: one describe call, then one commit
    /// history call for the timestamp.
    pub(super) fn file_metadata(&self, path: &str) -> Result<FileEntry, FsError> {
        match self.describe(path)? {
            Description::File(file) => self.describe_to_file_entry(&file),
            Description::Directory(_) => Err(FsError::UnableToRetrieveMetadata {
                path: path.to_string(),
                reason: "path is a directory".to_string(),
            }),
        }
    }

    fn describe_to_file_entry(&self, file: &RawFile) -> Result<FileEntry, FsError> {
        Ok(FileEntry {
            path: file.path.clone(),
            size: Some(file.size),
            last_modified: Some(self.resolve_timestamp(&file.path)?),
            mime_type: mime_type_for(&file.path),
        })
    }
}
