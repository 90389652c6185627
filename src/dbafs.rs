//! Wiring of configuration, record store, filesystem and sync engine.

use crate::config::{DbafsConfig, FilesConfig};
use crate::entity::{File, Folder};
use crate::error::ApiError;
use crate::fs::LocalFilesystem;
use crate::policy::PathPolicy;
use crate::store::{CachedRecordStore, MemoryRecordStore, RecordStore, SledRecordStore};
use crate::sync::{SyncEngine, SyncReport};
use crate::tree::HashEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A filesystem root paired with the record store that mirrors it.
pub struct Dbafs {
    root: PathBuf,
    engine: SyncEngine,
}

impl Dbafs {
    /// Open the persistent store configured for `workspace_root`.
    pub fn open(workspace_root: &Path, config: &DbafsConfig) -> Result<Self, ApiError> {
        let store_path = config.storage.resolve_path(workspace_root)?;
        debug!(store = %store_path.display(), "opening record store");
        let store = SledRecordStore::open(&store_path, config.files.upload_path.clone())?;
        Self::with_store(
            workspace_root,
            &config.files,
            Arc::new(CachedRecordStore::new(store)),
        )
    }

    /// Records kept in memory only; nothing survives the process.
    pub fn in_memory(workspace_root: &Path, files: &FilesConfig) -> Result<Self, ApiError> {
        let store = MemoryRecordStore::new(files.upload_path.clone());
        Self::with_store(workspace_root, files, Arc::new(store))
    }

    pub fn with_store(
        workspace_root: &Path,
        files: &FilesConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, ApiError> {
        let fs = LocalFilesystem::new(workspace_root)?;
        let root = fs.root().to_path_buf();
        let engine = SyncEngine::new(
            PathPolicy::from_config(files),
            store,
            Arc::new(fs),
            HashEngine::with_size_limit(files.size_limit),
        );
        Ok(Self { root, engine })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn folder(&self, path: &str) -> Result<Folder<'_>, ApiError> {
        Folder::open(self, path)
    }

    pub fn file(&self, path: &str) -> Result<File<'_>, ApiError> {
        File::open(self, path)
    }

    pub fn reconcile(&self, prefix: &str) -> Result<SyncReport, ApiError> {
        self.engine.reconcile(prefix)
    }

    pub fn flush(&self) -> Result<(), ApiError> {
        Ok(self.engine.store().flush()?)
    }
}
