//! Physical filesystem collaborator
//!
//! All paths are relative to a fixed root, in the normalized form produced by
//! [`crate::path::normalize`]. The synchronization engine never touches the
//! native filesystem except through this trait (hashing reads resolved paths).

pub mod local;

pub use local::LocalFilesystem;

use crate::error::ApiError;
use std::path::PathBuf;

pub trait Filesystem: Send + Sync {
    /// Absolute location of a relative path.
    fn resolve(&self, path: &str) -> PathBuf;

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn is_file(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    /// Sorted entry names of a directory.
    fn scan(&self, path: &str) -> Result<Vec<String>, ApiError>;

    /// Create one directory level; succeeds if it already exists.
    fn mkdir(&self, path: &str) -> Result<(), ApiError>;

    fn rename(&self, from: &str, to: &str) -> Result<(), ApiError>;

    /// Recursive copy of a file or a directory tree.
    fn rcopy(&self, from: &str, to: &str) -> Result<(), ApiError>;

    /// Recursive remove; with `keep_root` only the directory contents go.
    fn rrdir(&self, path: &str, keep_root: bool) -> Result<(), ApiError>;

    fn remove_file(&self, path: &str) -> Result<(), ApiError>;

    fn chmod(&self, path: &str, mode: u32) -> Result<(), ApiError>;

    fn put_content(&self, path: &str, bytes: &[u8]) -> Result<(), ApiError>;
}
