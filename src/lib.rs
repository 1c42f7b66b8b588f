//! Read-only filesystem access to GitHub repositories.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ghfs_remote::{Config, GithubClient, GithubFs, ReadFilesystem};
//!
//! let config = Config::load()?;
//! let client = Arc::new(GithubClient::new(&config));
//! let fs = GithubFs::with_services("octocat/Hello-World".parse()?, client);
//!
//! for entry in fs.list_contents("", false)? {
//!     println!("{}", entry.path());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapter;
pub mod config;
pub mod filesystem;
pub mod github;
pub mod types;

pub use adapter::GithubFs;
pub use config::Config;
pub use filesystem::{Entry, FileEntry, FsError, ReadFilesystem, WriteFilesystem};
pub use github::{GithubClient, MemoryRepository};
pub use types::RepoRef;
