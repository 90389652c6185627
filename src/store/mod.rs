//! File Record Store
//!
//! Repository interface over [`FileSystemNode`] values: one record per tracked
//! file or folder below the upload root. Stores are pure persistence; they
//! never inspect the filesystem or compute fingerprints.

pub mod cache;
pub mod memory;
pub mod persistence;

pub use cache::CachedRecordStore;
pub use memory::MemoryRecordStore;
pub use persistence::SledRecordStore;

use crate::error::StorageError;
use crate::path;
use crate::types::{Fingerprint, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// One tracked filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemNode {
    pub id: NodeId,
    /// `None` when the parent is the upload root.
    pub parent_id: Option<NodeId>,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub extension: String,
    pub hash: Fingerprint,
    pub size: u64,
    /// Unix seconds of the last mutation.
    pub tstamp: i64,
    /// Optimistic concurrency token, bumped by every save.
    pub version: u64,
}

impl FileSystemNode {
    pub fn new(id: NodeId, parent_id: Option<NodeId>, path: &str, kind: NodeKind) -> Self {
        let mut node = FileSystemNode {
            id,
            parent_id,
            path: String::new(),
            name: String::new(),
            kind,
            extension: String::new(),
            hash: Fingerprint::default(),
            size: 0,
            tstamp: 0,
            version: 0,
        };
        node.set_path(path);
        node.touch();
        node
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Update `path` and the fields derived from it.
    pub fn set_path(&mut self, new_path: &str) {
        self.path = new_path.to_string();
        self.name = path::basename(new_path).to_string();
        self.extension = match self.kind {
            NodeKind::File => path::extension(new_path),
            NodeKind::Folder => String::new(),
        };
    }

    pub fn touch(&mut self) {
        self.tstamp = chrono::Utc::now().timestamp();
    }
}

/// Lookup options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Bypass any read cache; required right after a write.
    pub uncached: bool,
}

impl FindOptions {
    pub fn uncached() -> Self {
        FindOptions { uncached: true }
    }
}

/// Record store interface
pub trait RecordStore: Send + Sync {
    fn find_by_path(
        &self,
        path: &str,
        opts: FindOptions,
    ) -> Result<Option<FileSystemNode>, StorageError>;

    fn find_by_id(&self, id: NodeId) -> Result<Option<FileSystemNode>, StorageError>;

    /// All records strictly below `prefix`, ordered by path.
    fn find_all_under_prefix(&self, prefix: &str) -> Result<Vec<FileSystemNode>, StorageError>;

    /// Create a record; the parent id comes from the existing parent record.
    fn create(&self, path: &str, kind: NodeKind) -> Result<FileSystemNode, StorageError>;

    /// Store a copy of `node` under a fresh id.
    fn insert(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError>;

    /// Overwrite the record with the same id. Returns the stored value.
    fn save(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError>;

    fn delete(&self, node: &FileSystemNode) -> Result<(), StorageError>;

    /// Every record, ordered by path.
    fn all(&self) -> Result<Vec<FileSystemNode>, StorageError>;

    /// Make pending writes durable.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Parent id for a new record at `child_path`.
///
/// The upload root has no record, so its children get `None`; any other
/// parent must already be recorded.
pub(crate) fn resolve_parent_id(
    upload_path: &str,
    child_path: &str,
    lookup: impl FnOnce(&str) -> Result<Option<NodeId>, StorageError>,
) -> Result<Option<NodeId>, StorageError> {
    let parent = path::dirname(child_path);
    if parent == upload_path {
        return Ok(None);
    }
    match lookup(parent)? {
        Some(id) => Ok(Some(id)),
        None => Err(StorageError::MissingAncestor(child_path.to_string())),
    }
}

/// Path-index range start for records below `prefix`.
pub(crate) fn child_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    }
}
