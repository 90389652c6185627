//! Directory walker
//!
//! Lazy depth-first traversal below a directory. Siblings are visited in
//! file-name order so every consumer (hashing, scanning) sees the same
//! sequence regardless of on-disk creation order. The iterator is finite and
//! single-pass.

use crate::error::ApiError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One entry produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Forward-slash path relative to the walk root.
    pub relative_path: String,
    pub is_file: bool,
    /// Byte length for files, zero for directories.
    pub size: u64,
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    skip_names: Vec<String>,
    files_only: bool,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_names: Vec::new(),
            files_only: false,
        }
    }

    /// Prune entries (and whole directories) with one of these file names.
    pub fn skip_names(mut self, names: &[&str]) -> Self {
        self.skip_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn files_only(mut self) -> Self {
        self.files_only = true;
        self
    }

    pub fn walk(self) -> impl Iterator<Item = Result<WalkEntry, ApiError>> {
        let Walker {
            root,
            skip_names,
            files_only,
        } = self;

        WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                !skip_names.iter().any(|skip| *skip == name)
            })
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => return Some(Err(ApiError::Walk(e))),
                };
                let is_file = entry.file_type().is_file();
                if files_only && !is_file {
                    return None;
                }
                if !is_file && !entry.file_type().is_dir() {
                    // Symlinks and special files are not tracked.
                    return None;
                }
                let size = if is_file {
                    match entry.metadata() {
                        Ok(meta) => meta.len(),
                        Err(e) => return Some(Err(ApiError::Walk(e))),
                    }
                } else {
                    0
                };
                Some(Ok(WalkEntry {
                    relative_path: relative_slash_path(&root, entry.path()),
                    is_file,
                    size,
                }))
            })
    }
}

/// Walk everything below `root`.
pub fn walk(root: &Path) -> impl Iterator<Item = Result<WalkEntry, ApiError>> {
    Walker::new(root).walk()
}

fn relative_slash_path(root: &Path, full: &Path) -> String {
    let relative = full.strip_prefix(root).unwrap_or(full);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
