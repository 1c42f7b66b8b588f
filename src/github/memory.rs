//! In-memory repository implementing every remote capability.
//!
//! Directories are implied by the files stored beneath them. Revisions are
//! ignored: the repository has a single state.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{
    CommitQuery, CommitsService, ContentsService, Description, RawCommit, RawFile, RawItem,
    ServiceError, Tree, TreeService,
};
use crate::types::RepoRef;

/// Width at which file content is wrapped, matching the contents API.
const CONTENT_LINE_WIDTH: usize = 60;

/// Number of calls made to each capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub exists: usize,
    pub describe: usize,
    pub tree: usize,
    pub commits: usize,
}

#[derive(Default)]
struct Counters {
    exists: AtomicUsize,
    describe: AtomicUsize,
    tree: AtomicUsize,
    commits: AtomicUsize,
}

#[derive(Default)]
pub struct MemoryRepository {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    /// Committer dates per path, newest first.
    commits: RwLock<HashMap<String, Vec<String>>>,
    counters: Counters,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file, replacing any previous content at `path`.
    pub fn insert_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.insert(normalize(path).to_string(), content.into());
    }

    /// Records a commit touching `path`; later calls are newer.
    pub fn add_commit(&self, path: &str, committer_date: &str) {
        let mut commits = self.commits.write().unwrap_or_else(PoisonError::into_inner);
        commits
            .entry(normalize(path).to_string())
            .or_default()
            .insert(0, committer_date.to_string());
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            exists: self.counters.exists.load(Ordering::Relaxed),
            describe: self.counters.describe.load(Ordering::Relaxed),
            tree: self.counters.tree.load(Ordering::Relaxed),
            commits: self.counters.commits.load(Ordering::Relaxed),
        }
    }

    fn is_dir(files: &BTreeMap<String, Vec<u8>>, path: &str) -> bool {
        path.is_empty() || files.keys().any(|k| is_strictly_under(k, path))
    }

    /// Every implied directory, as repository-relative paths.
    fn directories(files: &BTreeMap<String, Vec<u8>>) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        for path in files.keys() {
            let mut end = 0;
            while let Some(offset) = path[end..].find('/') {
                end += offset;
                dirs.insert(path[..end].to_string());
                end += 1;
            }
        }
        dirs
    }
}

impl ContentsService for MemoryRepository {
    fn exists(&self, _repo: &RepoRef, path: &str) -> Result<bool, ServiceError> {
        self.counters.exists.fetch_add(1, Ordering::Relaxed);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let path = normalize(path);
        Ok(files.contains_key(path) || Self::is_dir(&files, path))
    }

    fn describe(&self, _repo: &RepoRef, path: &str) -> Result<Description, ServiceError> {
        self.counters.describe.fetch_add(1, Ordering::Relaxed);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let path = normalize(path);

        if let Some(content) = files.get(path) {
            return Ok(Description::File(RawFile {
                path: path.to_string(),
                kind: Some("file".to_string()),
                size: content.len() as u64,
                content: Some(wrap_lines(&STANDARD.encode(content))),
                encoding: Some("base64".to_string()),
            }));
        }

        if !Self::is_dir(&files, path) {
            return Err(ServiceError::NotFound(path.to_string()));
        }

        let mut children: BTreeMap<String, RawItem> = BTreeMap::new();
        for (file_path, content) in files.iter() {
            let rest = if path.is_empty() {
                file_path.as_str()
            } else if is_strictly_under(file_path, path) {
                &file_path[path.len() + 1..]
            } else {
                continue;
            };

            let (name, kind, size) = match rest.split_once('/') {
                Some((dir, _)) => (dir, "dir", None),
                None => (rest, "file", Some(content.len() as u64)),
            };
            let child = join(path, name);
            children.entry(child.clone()).or_insert(RawItem {
                path: child,
                kind: Some(kind.to_string()),
                size,
            });
        }

        Ok(Description::Directory(children.into_values().collect()))
    }
}

impl TreeService for MemoryRepository {
    fn describe_recursive(&self, _repo: &RepoRef, _revision: &str) -> Result<Tree, ServiceError> {
        self.counters.tree.fetch_add(1, Ordering::Relaxed);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        let mut items: Vec<RawItem> = Self::directories(&files)
            .into_iter()
            .map(|dir| RawItem::new(dir, "tree"))
            .collect();
        items.extend(files.iter().map(|(path, content)| RawItem {
            path: path.clone(),
            kind: Some("blob".to_string()),
            size: Some(content.len() as u64),
        }));
        items.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Tree {
            sha: None,
            tree: items,
            truncated: false,
        })
    }
}

impl CommitsService for MemoryRepository {
    fn list(&self, _repo: &RepoRef, query: &CommitQuery) -> Result<Vec<RawCommit>, ServiceError> {
        self.counters.commits.fetch_add(1, Ordering::Relaxed);
        let commits = self.commits.read().unwrap_or_else(PoisonError::into_inner);

        let Some(dates) = commits.get(normalize(&query.path)) else {
            return Ok(Vec::new());
        };

        let per_page = query.per_page.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * per_page;
        Ok(dates
            .iter()
            .skip(skip)
            .take(per_page)
            .map(|d| RawCommit::with_committer_date(d.clone()))
            .collect())
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

fn is_strictly_under(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

fn wrap_lines(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / CONTENT_LINE_WIDTH + 1);
    for chunk in encoded.as_bytes().chunks(CONTENT_LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_ref() -> RepoRef {
        "octocat/fixture".parse().unwrap()
    }

    fn sample() -> MemoryRepository {
        let repo = MemoryRepository::new();
        repo.insert_file("README.md", "hello");
        repo.insert_file("src/lib.rs", "pub mod a;");
        repo.insert_file("src/a/mod.rs", "");
        repo
    }

    #[test]
    fn exists_for_files_and_implied_dirs() {
        let repo = sample();
        let r = repo_ref();
        assert!(repo.exists(&r, "/README.md").unwrap());
        assert!(repo.exists(&r, "src").unwrap());
        assert!(repo.exists(&r, "src/a/").unwrap());
        assert!(!repo.exists(&r, "sr").unwrap());
        assert_eq!(repo.calls().exists, 4);
    }

    #[test]
    fn describe_directory_lists_immediate_children() {
        let repo = sample();
        let Description::Directory(items) = repo.describe(&repo_ref(), "src").unwrap() else {
            panic!("expected directory");
        };
        let paths: Vec<_> = items.iter().map(|i| (i.path.as_str(), i.kind.as_deref())).collect();
        assert_eq!(paths, vec![("src/a", Some("dir")), ("src/lib.rs", Some("file"))]);
    }

    #[test]
    fn describe_file_wraps_base64() {
        let repo = MemoryRepository::new();
        repo.insert_file("big.bin", vec![7u8; 100]);
        let Description::File(file) = repo.describe(&repo_ref(), "big.bin").unwrap() else {
            panic!("expected file");
        };
        let content = file.content.unwrap();
        assert!(content.lines().all(|l| l.len() <= CONTENT_LINE_WIDTH));
        assert!(content.contains('\n'));
        assert_eq!(file.size, 100);
    }

    #[test]
    fn describe_missing_is_not_found() {
        let repo = sample();
        assert!(matches!(
            repo.describe(&repo_ref(), "nope"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn tree_contains_blobs_and_trees() {
        let repo = sample();
        let tree = repo.describe_recursive(&repo_ref(), "main").unwrap();
        let paths: Vec<_> = tree
            .tree
            .iter()
            .map(|i| (i.path.as_str(), i.kind.as_deref().unwrap()))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("README.md", "blob"),
                ("src", "tree"),
                ("src/a", "tree"),
                ("src/a/mod.rs", "blob"),
                ("src/lib.rs", "blob"),
            ]
        );
    }

    #[test]
    fn commits_are_newest_first_and_paged() {
        let repo = sample();
        repo.add_commit("README.md", "2020-01-01T00:00:00Z");
        repo.add_commit("README.md", "2021-01-01T00:00:00Z");

        let query = CommitQuery {
            page: 1,
            per_page: 1,
            path: "/README.md".to_string(),
            revision: None,
        };
        let commits = repo.list(&repo_ref(), &query).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].committer_date(), Some("2021-01-01T00:00:00Z"));

        let second = repo
            .list(&repo_ref(), &CommitQuery { page: 2, ..query })
            .unwrap();
        assert_eq!(second[0].committer_date(), Some("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn poisoned_lock_keeps_serving() {
        use std::sync::Arc;

        let repo = Arc::new(sample());
        let poisoner = Arc::clone(&repo);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.files.write().unwrap();
            panic!("poison the file map");
        })
        .join();
        assert!(repo.files.is_poisoned());

        repo.insert_file("late.txt", "x");
        assert!(repo.exists(&repo_ref(), "late.txt").unwrap());
        assert!(repo.exists(&repo_ref(), "README.md").unwrap());
    }
}
