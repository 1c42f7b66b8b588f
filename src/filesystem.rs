//! Filesystem abstraction implemented by the repository adapter.
//!
//! Reading and mutating are separate traits: a backend that cannot write
//! still answers every [`WriteFilesystem`] call, with
//! [`FsError::Unsupported`].

use std::io::{Cursor, Read};

use thiserror::Error;

use crate::github::ServiceError;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("remote request for '{path}' failed: {source}")]
    Service {
        path: String,
        #[source]
        source: ServiceError,
    },

    #[error("unable to read '{path}': {reason}")]
    UnableToRead { path: String, reason: String },

    #[error("invalid base64 content for '{path}': {source}")]
    InvalidEncoding {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("unable to retrieve metadata for '{path}': {reason}")]
    UnableToRetrieveMetadata { path: String, reason: String },

    #[error("{operation} is not supported on a read-only repository (path '{path}')")]
    Unsupported {
        operation: &'static str,
        path: String,
    },
}

/// Metadata for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    /// In listings, whatever size the remote reported for the item.
    pub size: Option<u64>,
    /// Seconds since the epoch; 0 when unknown, unset in listings.
    pub last_modified: Option<i64>,
    /// Guessed from the extension; empty when unknown.
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::File(f) => &f.path,
            Entry::Directory(d) => &d.path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Options accepted by mutating operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub visibility: Option<Visibility>,
}

pub trait ReadFilesystem {
    type Listing: Iterator<Item = Entry>;

    fn file_exists(&self, path: &str) -> Result<bool, FsError>;

    fn directory_exists(&self, path: &str) -> Result<bool, FsError>;

    fn read(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// The bytes of [`read`](Self::read) behind a seekable reader positioned at the start.
    fn read_stream(&self, path: &str) -> Result<Cursor<Vec<u8>>, FsError> {
        Ok(Cursor::new(self.read(path)?))
    }

    fn visibility(&self, path: &str) -> Result<FileEntry, FsError>;

    fn mime_type(&self, path: &str) -> Result<FileEntry, FsError>;

    fn last_modified(&self, path: &str) -> Result<FileEntry, FsError>;

    fn file_size(&self, path: &str) -> Result<FileEntry, FsError>;

    /// Entries directly under `path`, or every entry beneath it when `deep`.
    fn list_contents(&self, path: &str, deep: bool) -> Result<Self::Listing, FsError>;
}

pub trait WriteFilesystem {
    fn write(&self, path: &str, contents: &[u8], options: &WriteOptions) -> Result<(), FsError>;

    fn write_stream(
        &self,
        path: &str,
        contents: &mut dyn Read,
        options: &WriteOptions,
    ) -> Result<(), FsError>;

    fn delete(&self, path: &str) -> Result<(), FsError>;

    fn delete_directory(&self, path: &str) -> Result<(), FsError>;

    fn create_directory(&self, path: &str, options: &WriteOptions) -> Result<(), FsError>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError>;

    fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> Result<(), FsError>;

    fn copy_file(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_accessors() {
        let file = Entry::File(FileEntry {
            path: "a/b.txt".to_string(),
            size: None,
            last_modified: None,
            mime_type: "text/plain".to_string(),
        });
        let dir = Entry::Directory(DirectoryEntry {
            path: "a".to_string(),
        });

        assert_eq!(file.path(), "a/b.txt");
        assert!(file.is_file());
        assert_eq!(dir.path(), "a");
        assert!(!dir.is_file());
    }

    #[test]
    fn service_error_keeps_source() {
        use std::error::Error;

        let err = FsError::Service {
            path: "x".to_string(),
            source: ServiceError::Transport("connection reset".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "remote request for 'x' failed: transport error: connection reset"
        );
        assert!(err.source().is_some());
    }
}
