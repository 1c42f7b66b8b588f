use super::metadata::mime_type_for;
use super::{DEFAULT_TREE_REVISION, GithubFs, is_file_kind};
use crate::filesystem::{DirectoryEntry, Entry, FileEntry, FsError};
use crate::github::{Description, RawItem};

/// Entries of a directory listing, classified as they are pulled.
///
/// The remote items are fetched up front by a single call; iterating does
/// no further I/O. Listing again means calling `list_contents` again.
#[derive(Debug)]
pub struct Listing {
    items: std::vec::IntoIter<RawItem>,
}

impl Listing {
    fn new(items: Vec<RawItem>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl Iterator for Listing {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        self.items.next().map(classify)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Listing {}

/// Turns a raw listing item into an entry. Files keep the size the remote
/// reported; timestamps are never resolved per item.
pub(crate) fn classify(item: RawItem) -> Entry {
    if is_file_kind(item.kind.as_deref()) {
        Entry::File(FileEntry {
            mime_type: mime_type_for(&item.path),
            path: item.path,
            size: item.size,
            last_modified: None,
        })
    } else {
        Entry::Directory(DirectoryEntry { path: item.path })
    }
}

/// Whether `item` lies strictly below the directory `dir` (root when empty).
fn is_below(item: &str, dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        return true;
    }
    item.len() > dir.len() && item.starts_with(dir) && item.as_bytes()[dir.len()] == b'/'
}

impl GithubFs {
    pub(super) fn listing(&self, path: &str, deep: bool) -> Result<Listing, FsError> {
        let items = if deep {
            self.tree_items(path)?
        } else {
            match self.describe(path)? {
                Description::Directory(items) => items,
                Description::File(file) => vec![RawItem {
                    path: file.path,
                    kind: file.kind,
                    size: Some(file.size),
                }],
            }
        };

        Ok(Listing::new(items))
    }

    fn tree_items(&self, path: &str) -> Result<Vec<RawItem>, FsError> {
        let revision = self.repo.revision_str().unwrap_or(DEFAULT_TREE_REVISION);

        log::debug!("tree {}:{} at {}", self.repo, path, revision);
        let tree = self
            .trees
            .describe_recursive(&self.repo, revision)
            .map_err(|source| FsError::Service {
                path: path.to_string(),
                source,
            })?;

        if tree.truncated {
            log::warn!(
                "Recursive tree for {} at {} was truncated by the remote",
                self.repo,
                revision
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|item| is_below(&item.path, path))
            .collect())
    }
}
