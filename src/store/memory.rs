//! In-memory record store

use super::{child_prefix, resolve_parent_id, FileSystemNode, FindOptions, RecordStore};
use crate::error::StorageError;
use crate::types::{NodeId, NodeKind};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<NodeId, FileSystemNode>,
    paths: BTreeMap<String, NodeId>,
    last_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> NodeId {
        self.last_id += 1;
        NodeId(self.last_id)
    }

    fn put_new(&mut self, node: FileSystemNode) -> Result<FileSystemNode, StorageError> {
        if self.paths.contains_key(&node.path) {
            return Err(StorageError::DuplicatePath(node.path));
        }
        self.paths.insert(node.path.clone(), node.id);
        self.nodes.insert(node.id, node.clone());
        Ok(node)
    }
}

/// Record store kept entirely in memory.
pub struct MemoryRecordStore {
    upload_path: String,
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new(upload_path: impl Into<String>) -> Self {
        Self {
            upload_path: upload_path.into(),
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryRecordStore {
    fn find_by_path(
        &self,
        path: &str,
        _opts: FindOptions,
    ) -> Result<Option<FileSystemNode>, StorageError> {
        let inner = self.inner.read();
        Ok(inner
            .paths
            .get(path)
            .and_then(|id| inner.nodes.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: NodeId) -> Result<Option<FileSystemNode>, StorageError> {
        Ok(self.inner.read().nodes.get(&id).cloned())
    }

    fn find_all_under_prefix(&self, prefix: &str) -> Result<Vec<FileSystemNode>, StorageError> {
        let start = child_prefix(prefix);
        let inner = self.inner.read();
        Ok(inner
            .paths
            .range(start.clone()..)
            .take_while(|(path, _)| path.starts_with(&start))
            .filter_map(|(_, id)| inner.nodes.get(id).cloned())
            .collect())
    }

    fn create(&self, path: &str, kind: NodeKind) -> Result<FileSystemNode, StorageError> {
        let mut inner = self.inner.write();
        let parent_id = resolve_parent_id(&self.upload_path, path, |parent| {
            Ok(inner.paths.get(parent).copied())
        })?;
        let id = inner.next_id();
        inner.put_new(FileSystemNode::new(id, parent_id, path, kind))
    }

    fn insert(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        let mut inner = self.inner.write();
        let mut copy = node.clone();
        copy.id = inner.next_id();
        copy.version = 0;
        inner.put_new(copy)
    }

    fn save(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        let mut inner = self.inner.write();
        let current = inner
            .nodes
            .get(&node.id)
            .cloned()
            .ok_or_else(|| StorageError::RecordNotFound(node.path.clone()))?;
        if current.version != node.version {
            return Err(StorageError::VersionConflict {
                path: node.path.clone(),
                expected: node.version,
                found: current.version,
            });
        }
        if current.path != node.path {
            if let Some(owner) = inner.paths.get(&node.path) {
                if *owner != node.id {
                    return Err(StorageError::DuplicatePath(node.path.clone()));
                }
            }
            inner.paths.remove(&current.path);
            inner.paths.insert(node.path.clone(), node.id);
        }
        let mut stored = node.clone();
        stored.version = current.version + 1;
        inner.nodes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn delete(&self, node: &FileSystemNode) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if let Some(current) = inner.nodes.remove(&node.id) {
            if inner.paths.get(&current.path) == Some(&current.id) {
                inner.paths.remove(&current.path);
            }
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<FileSystemNode>, StorageError> {
        self.find_all_under_prefix("")
    }
}
