//! Synchronization engine
//!
//! Turns a filesystem mutation (add, rename, copy, purge, delete) into the
//! record store mutations and fingerprint updates that keep both sides
//! consistent. Filesystem and store writes are not transactional with each
//! other: every operation runs them in a fixed order and a failure halfway
//! leaves a state that [`SyncEngine::reconcile`] repairs.

pub mod scan;

pub use scan::SyncReport;

use crate::error::ApiError;
use crate::fs::Filesystem;
use crate::path;
use crate::policy::PathPolicy;
use crate::store::{FileSystemNode, FindOptions, RecordStore};
use crate::tree::hasher::{HashEngine, HASH_SKIP_NAMES};
use crate::tree::walker::Walker;
use crate::types::{NodeId, NodeKind};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SyncEngine {
    policy: PathPolicy,
    store: Arc<dyn RecordStore>,
    fs: Arc<dyn Filesystem>,
    hasher: HashEngine,
}

impl SyncEngine {
    pub fn new(
        policy: PathPolicy,
        store: Arc<dyn RecordStore>,
        fs: Arc<dyn Filesystem>,
        hasher: HashEngine,
    ) -> Self {
        Self {
            policy,
            store,
            fs,
            hasher,
        }
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn hasher(&self) -> &HashEngine {
        &self.hasher
    }

    /// Whether `path` carries (or may carry) a record.
    ///
    /// Policy-approved paths, minus platform artifacts such as `.DS_Store`.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.policy.should_sync(path) && !HASH_SKIP_NAMES.contains(&path::basename(path))
    }

    /// Record `path`, creating missing ancestor records on the way down.
    ///
    /// Returns `None` when the path is not synchronized.
    pub fn add_resource(&self, path: &str) -> Result<Option<FileSystemNode>, ApiError> {
        let path = path::normalize(path)?;
        if !self.is_tracked(&path) {
            return Ok(None);
        }
        self.ensure_record(&path).map(Some)
    }

    /// Recompute the fingerprint of `path` and of every ancestor folder below
    /// the upload root.
    pub fn update_folder_hashes(&self, path: &str) -> Result<(), ApiError> {
        let path = path::normalize(path)?;
        if !self.policy.should_sync(&path) {
            return Ok(());
        }
        let upload_path = self.policy.upload_path().to_string();
        let mut current = path.as_str();
        while !self.policy.is_upload_root(current) && path::is_within(current, &upload_path) {
            if self.fs.is_dir(current) {
                let node = match self.find(current)? {
                    Some(node) => node,
                    None => self.ensure_record(current)?,
                };
                if node.is_folder() {
                    self.refresh_folder(node)?;
                }
            }
            current = path::dirname(current);
        }
        Ok(())
    }

    /// Create every missing directory level of `path`.
    ///
    /// A newly created tracked folder is recorded and its parent chain
    /// rehashed. Returns whether anything was created.
    pub fn create_folder(&self, path: &str) -> Result<bool, ApiError> {
        let path = path::normalize(path)?;
        if self.fs.is_file(&path) {
            return Err(ApiError::NotADirectory(path));
        }
        if self.fs.is_dir(&path) {
            return Ok(false);
        }
        for segment in path::descend_from("", &path) {
            self.fs.mkdir(&segment)?;
        }
        if self.is_tracked(&path) && !self.policy.is_upload_root(&path) {
            self.ensure_record(&path)?;
            self.update_folder_hashes(&path)?;
        }
        Ok(true)
    }

    /// Move `old` to `new` on disk and in the store.
    pub fn rename(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let (old, new) = self.check_transfer(old, new)?;
        match (self.is_tracked(&old), self.is_tracked(&new)) {
            (true, true) => self.move_records(&old, &new),
            (true, false) => {
                self.create_folder(path::dirname(&new))?;
                self.fs.rename(&old, &new)?;
                self.forget(&old)?;
                self.update_folder_hashes(path::dirname(&old))
            }
            (false, true) => {
                self.create_folder(path::dirname(&new))?;
                self.fs.rename(&old, &new)?;
                self.record_arrival(&new)
            }
            (false, false) => {
                self.create_folder(path::dirname(&new))?;
                self.fs.rename(&old, &new)
            }
        }
    }

    /// Copy `old` to `new` on disk; records of the source are cloned.
    pub fn copy_to(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let (old, new) = self.check_transfer(old, new)?;
        match (self.is_tracked(&old), self.is_tracked(&new)) {
            (true, true) => self.clone_records(&old, &new),
            (false, true) => {
                self.create_folder(path::dirname(&new))?;
                self.fs.rcopy(&old, &new)?;
                self.record_arrival(&new)
            }
            (_, false) => {
                self.create_folder(path::dirname(&new))?;
                self.fs.rcopy(&old, &new)
            }
        }
    }

    /// Empty the folder on disk and drop the records below it.
    pub fn purge(&self, path: &str) -> Result<(), ApiError> {
        let path = path::normalize(path)?;
        if self.fs.is_file(&path) {
            return Err(ApiError::NotADirectory(path));
        }
        self.fs.rrdir(&path, true)?;
        if !self.policy.should_sync(&path) {
            return Ok(());
        }
        let mut removed = 0usize;
        for node in self.store.find_all_under_prefix(&path)? {
            self.store.delete(&node)?;
            removed += 1;
        }
        info!(path = %path, removed, "purged folder");
        self.update_folder_hashes(&path)
    }

    /// Remove the entry on disk together with its record and all records below it.
    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        let path = path::normalize(path)?;
        if self.fs.is_dir(&path) {
            self.fs.rrdir(&path, false)?;
        } else if self.fs.is_file(&path) {
            self.fs.remove_file(&path)?;
        }
        if !self.policy.should_sync(&path) {
            return Ok(());
        }
        let removed = self.forget(&path)?;
        info!(path = %path, removed, "deleted resource");
        self.update_folder_hashes(path::dirname(&path))
    }

    /// Bring the record of a file in line with its current content.
    pub fn sync_file(&self, path: &str) -> Result<Option<FileSystemNode>, ApiError> {
        let path = path::normalize(path)?;
        if !self.is_tracked(&path) {
            return Ok(None);
        }
        let node = match self.find(&path)? {
            Some(node) if node.kind == NodeKind::File => self.refresh_file(node)?,
            Some(_) => {
                self.forget(&path)?;
                self.ensure_record(&path)?
            }
            None => self.ensure_record(&path)?,
        };
        self.update_folder_hashes(path::dirname(&path))?;
        Ok(Some(node))
    }

    fn find(&self, path: &str) -> Result<Option<FileSystemNode>, ApiError> {
        Ok(self.store.find_by_path(path, FindOptions::uncached())?)
    }

    fn check_transfer(&self, old: &str, new: &str) -> Result<(String, String), ApiError> {
        let old = path::normalize(old)?;
        let new = path::normalize(new)?;
        if !self.fs.exists(&old) {
            return Err(ApiError::NotFound(old));
        }
        if self.fs.exists(&new) {
            return Err(ApiError::AlreadyExists(new));
        }
        if new.is_empty() || path::is_within(&new, &old) {
            return Err(ApiError::InvalidPath(new));
        }
        Ok((old, new))
    }

    fn ensure_record(&self, path: &str) -> Result<FileSystemNode, ApiError> {
        if self.policy.is_upload_root(path) || !self.policy.should_sync(path) {
            return Err(ApiError::InvalidResource(path.to_string()));
        }
        if !self.fs.exists(path) {
            return Err(ApiError::NotFound(path.to_string()));
        }
        let mut leaf = None;
        for current in path::descend_from(self.policy.upload_path(), path) {
            let node = match self.find(&current)? {
                Some(existing) => existing,
                None => self.record_new(&current)?,
            };
            leaf = Some(node);
        }
        leaf.ok_or_else(|| ApiError::InvalidResource(path.to_string()))
    }

    /// Create the record for an unrecorded entry whose parent is recorded.
    /// New folders bring their whole (tracked) subtree along.
    fn record_new(&self, path: &str) -> Result<FileSystemNode, ApiError> {
        let kind = if self.fs.is_dir(path) {
            NodeKind::Folder
        } else {
            NodeKind::File
        };
        let node = self.store.create(path, kind)?;
        debug!(path = %path, id = %node.id, kind = %kind, "recorded resource");
        if kind == NodeKind::File {
            return self.refresh_file(node);
        }

        let mut folders = vec![node];
        let walker = Walker::new(self.fs.resolve(path)).skip_names(HASH_SKIP_NAMES);
        for entry in walker.walk() {
            let entry = entry?;
            let child_path = path::join(path, &entry.relative_path);
            if !self.is_tracked(&child_path) || self.find(&child_path)?.is_some() {
                continue;
            }
            let child_kind = if entry.is_file {
                NodeKind::File
            } else {
                NodeKind::Folder
            };
            let child = self.store.create(&child_path, child_kind)?;
            debug!(path = %child_path, id = %child.id, kind = %child_kind, "recorded resource");
            match child_kind {
                NodeKind::File => {
                    self.refresh_file(child)?;
                }
                NodeKind::Folder => folders.push(child),
            }
        }

        // Deepest folders first; the sort is stable so `path` stays last among equals.
        folders.sort_by_key(|n| Reverse(path::depth(&n.path)));
        let mut refreshed = None;
        for folder in folders {
            let stored = self.refresh_folder(folder)?;
            if stored.path == path {
                refreshed = Some(stored);
            }
        }
        refreshed.ok_or_else(|| ApiError::NotFound(path.to_string()))
    }

    fn refresh_file(&self, mut node: FileSystemNode) -> Result<FileSystemNode, ApiError> {
        let location = self.fs.resolve(&node.path);
        node.hash = self.hasher.hash_file(&location)?;
        node.size = self.hasher.size_of_file(&location)?;
        node.touch();
        Ok(self.store.save(&node)?)
    }

    fn refresh_folder(&self, mut node: FileSystemNode) -> Result<FileSystemNode, ApiError> {
        let location = self.fs.resolve(&node.path);
        node.hash = self.hasher.hash_folder(&location)?;
        node.size = self.hasher.size_of(&location)?;
        node.touch();
        debug!(path = %node.path, hash = %node.hash, "updated folder hash");
        Ok(self.store.save(&node)?)
    }

    /// Parent id for a record placed directly below `parent`.
    fn parent_id_for(&self, parent: &str) -> Result<Option<NodeId>, ApiError> {
        if self.policy.is_upload_root(parent) {
            return Ok(None);
        }
        let node = match self.find(parent)? {
            Some(node) => node,
            None => self.ensure_record(parent)?,
        };
        Ok(Some(node.id))
    }

    /// Drop the record at `path` and every record below it.
    fn forget(&self, path: &str) -> Result<usize, ApiError> {
        let mut removed = 0;
        if let Some(node) = self.find(path)? {
            self.store.delete(&node)?;
            removed += 1;
        }
        for node in self.store.find_all_under_prefix(path)? {
            self.store.delete(&node)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Records left at a destination that no longer exists on disk.
    fn clear_stale(&self, path: &str) -> Result<(), ApiError> {
        let removed = self.forget(path)?;
        if removed > 0 {
            warn!(path = %path, removed, "removed stale records at destination");
        }
        Ok(())
    }

    /// Record an entry that just appeared at `path` from outside the tracked tree.
    fn record_arrival(&self, path: &str) -> Result<(), ApiError> {
        self.clear_stale(path)?;
        self.ensure_record(path)?;
        self.update_folder_hashes(path::dirname(path))
    }

    fn rehash_parents(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let new_parent = path::dirname(new);
        if !self.policy.is_upload_root(new_parent) {
            self.update_folder_hashes(new_parent)?;
        }
        let old_parent = path::dirname(old);
        if !self.policy.is_upload_root(old_parent) {
            self.update_folder_hashes(old_parent)?;
        }
        Ok(())
    }

    fn move_records(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let mut record = match self.find(old)? {
            Some(node) => node,
            None => self.ensure_record(old)?,
        };
        self.clear_stale(new)?;

        let new_parent = path::dirname(new);
        self.create_folder(new_parent)?;
        let parent_id = self.parent_id_for(new_parent)?;

        if record.is_folder() {
            let mut dropped = 0usize;
            for mut child in self.store.find_all_under_prefix(old)? {
                let Some(moved) = path::rebase(&child.path, old, new) else {
                    continue;
                };
                if !self.is_tracked(&moved) {
                    self.store.delete(&child)?;
                    dropped += 1;
                    continue;
                }
                child.set_path(&moved);
                child.touch();
                self.store.save(&child)?;
            }
            if dropped > 0 {
                debug!(to = %new, dropped, "dropped records moved into excluded paths");
            }
        }

        self.fs.rename(old, new)?;

        // The parent chain may have been rewritten above; start from a fresh read.
        if let Some(latest) = self.store.find_by_id(record.id)? {
            record = latest;
        }
        record.set_path(new);
        record.parent_id = parent_id;
        record.touch();
        self.store.save(&record)?;
        info!(from = %old, to = %new, "renamed resource");

        self.rehash_parents(old, new)
    }

    fn clone_records(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let source = match self.find(old)? {
            Some(node) => node,
            None => self.ensure_record(old)?,
        };
        self.clear_stale(new)?;

        let new_parent = path::dirname(new);
        self.create_folder(new_parent)?;
        let parent_id = self.parent_id_for(new_parent)?;

        let mut copy = source.clone();
        copy.set_path(new);
        copy.parent_id = parent_id;
        copy.touch();
        let copied_root = self.store.insert(&copy)?;

        if source.is_folder() {
            let mut copied_ids: HashMap<String, NodeId> = HashMap::new();
            copied_ids.insert(source.path.clone(), copied_root.id);
            for child in self.store.find_all_under_prefix(old)? {
                let Some(target) = path::rebase(&child.path, old, new) else {
                    continue;
                };
                if !self.is_tracked(&target) {
                    continue;
                }
                let parent_id = match copied_ids.get(path::dirname(&child.path)) {
                    Some(id) => Some(*id),
                    None => self.parent_id_for(path::dirname(&target))?,
                };
                let mut copy = child.clone();
                copy.set_path(&target);
                copy.parent_id = parent_id;
                copy.touch();
                let stored = self.store.insert(&copy)?;
                copied_ids.insert(child.path, stored.id);
            }
        }

        self.fs.rcopy(old, new)?;
        info!(from = %old, to = %new, "copied resource");

        self.rehash_parents(old, new)
    }
}
