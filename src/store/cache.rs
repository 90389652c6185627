//! Read-through path cache in front of another record store.
//!
//! Lookups by path are served from memory unless the caller asks for an
//! uncached read; every write refreshes or evicts the affected record.

use super::{FileSystemNode, FindOptions, RecordStore};
use crate::error::StorageError;
use crate::types::{NodeId, NodeKind};
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct CachedRecordStore<S> {
    inner: S,
    by_path: RwLock<HashMap<String, FileSystemNode>>,
}

impl<S: RecordStore> CachedRecordStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            by_path: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn clear(&self) {
        self.by_path.write().clear();
    }

    fn evict_id(&self, id: NodeId) {
        self.by_path.write().retain(|_, cached| cached.id != id);
    }

    fn remember(&self, node: &FileSystemNode) {
        let mut cache = self.by_path.write();
        cache.retain(|_, cached| cached.id != node.id);
        cache.insert(node.path.clone(), node.clone());
    }
}

impl<S: RecordStore> RecordStore for CachedRecordStore<S> {
    fn find_by_path(
        &self,
        path: &str,
        opts: FindOptions,
    ) -> Result<Option<FileSystemNode>, StorageError> {
        if !opts.uncached {
            if let Some(hit) = self.by_path.read().get(path) {
                return Ok(Some(hit.clone()));
            }
        }
        let found = self.inner.find_by_path(path, opts)?;
        match &found {
            Some(node) => self.remember(node),
            None => {
                self.by_path.write().remove(path);
            }
        }
        Ok(found)
    }

    fn find_by_id(&self, id: NodeId) -> Result<Option<FileSystemNode>, StorageError> {
        self.inner.find_by_id(id)
    }

    fn find_all_under_prefix(&self, prefix: &str) -> Result<Vec<FileSystemNode>, StorageError> {
        self.inner.find_all_under_prefix(prefix)
    }

    fn create(&self, path: &str, kind: NodeKind) -> Result<FileSystemNode, StorageError> {
        let node = self.inner.create(path, kind)?;
        self.remember(&node);
        Ok(node)
    }

    fn insert(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        let stored = self.inner.insert(node)?;
        self.remember(&stored);
        Ok(stored)
    }

    fn save(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        match self.inner.save(node) {
            Ok(stored) => {
                self.remember(&stored);
                Ok(stored)
            }
            Err(e) => {
                self.evict_id(node.id);
                Err(e)
            }
        }
    }

    fn delete(&self, node: &FileSystemNode) -> Result<(), StorageError> {
        self.inner.delete(node)?;
        self.evict_id(node.id);
        Ok(())
    }

    fn all(&self) -> Result<Vec<FileSystemNode>, StorageError> {
        self.inner.all()
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush()
    }
}
