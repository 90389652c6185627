//! Full reconciliation of a subtree against the disk.

use super::SyncEngine;
use crate::error::ApiError;
use crate::path;
use crate::store::FileSystemNode;
use crate::tree::hasher::HASH_SKIP_NAMES;
use crate::tree::walker::Walker;
use crate::types::NodeKind;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of a reconciliation pass, as relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub reparented: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.reparented.is_empty()
    }

    fn mark_updated(&mut self, path: &str) {
        if !self.added.iter().any(|p| p == path) && !self.updated.iter().any(|p| p == path) {
            self.updated.push(path.to_string());
        }
    }
}

impl SyncEngine {
    /// Compare every record under `prefix` with the disk and repair both
    /// directions: dangling records are removed, unrecorded entries added,
    /// stale fingerprints and parent links rewritten.
    pub fn reconcile(&self, prefix: &str) -> Result<SyncReport, ApiError> {
        let prefix = path::normalize(prefix)?;
        let mut report = SyncReport::default();
        if !self.policy.should_sync(&prefix) {
            debug!(prefix = %prefix, "prefix is not synchronized, nothing to reconcile");
            return Ok(report);
        }

        let on_disk = self.list_disk(&prefix)?;

        let mut records = self.store.find_all_under_prefix(&prefix)?;
        if let Some(own) = self.find(&prefix)? {
            records.push(own);
        }
        for node in records {
            if on_disk.get(&node.path) == Some(&node.kind) {
                continue;
            }
            warn!(path = %node.path, "removing dangling record");
            self.store.delete(&node)?;
            report.removed.push(node.path);
        }

        let ancestor = path::dirname(&prefix);
        if on_disk.contains_key(&prefix) {
            for missing in path::descend_from(self.policy.upload_path(), ancestor) {
                if self.find(&missing)?.is_none() {
                    self.store.create(&missing, NodeKind::Folder)?;
                    report.added.push(missing);
                }
            }
        }

        let mut folders = Vec::new();
        for (entry, kind) in &on_disk {
            match self.find(entry)? {
                None => {
                    let node = self.store.create(entry, *kind)?;
                    report.added.push(entry.clone());
                    match kind {
                        NodeKind::File => {
                            self.refresh_file(node)?;
                        }
                        NodeKind::Folder => folders.push(entry.clone()),
                    }
                }
                Some(node) => {
                    if *kind == NodeKind::Folder {
                        folders.push(entry.clone());
                    }
                    self.repair(node, &mut report)?;
                }
            }
        }

        folders.sort_by_key(|p| Reverse(path::depth(p)));
        for folder in folders {
            let Some(node) = self.find(&folder)? else {
                continue;
            };
            let location = self.fs.resolve(&folder);
            let hash = self.hasher.hash_folder(&location)?;
            let size = self.hasher.size_of(&location)?;
            if node.hash != hash || node.size != size {
                let mut node = node;
                node.hash = hash;
                node.size = size;
                node.touch();
                self.store.save(&node)?;
                report.mark_updated(&folder);
            }
        }

        if !self.policy.is_upload_root(&prefix) && !report.is_clean() {
            self.update_folder_hashes(ancestor)?;
        }

        info!(
            prefix = %prefix,
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            reparented = report.reparented.len(),
            "reconciled records"
        );
        Ok(report)
    }

    /// Tracked entries at and below `prefix`, parents ordered before children.
    fn list_disk(&self, prefix: &str) -> Result<BTreeMap<String, NodeKind>, ApiError> {
        let mut on_disk = BTreeMap::new();
        if !self.policy.is_upload_root(prefix) && self.is_tracked(prefix) {
            if self.fs.is_dir(prefix) {
                on_disk.insert(prefix.to_string(), NodeKind::Folder);
            } else if self.fs.is_file(prefix) {
                on_disk.insert(prefix.to_string(), NodeKind::File);
            }
        }
        if !self.fs.is_dir(prefix) {
            return Ok(on_disk);
        }
        let walker = Walker::new(self.fs.resolve(prefix)).skip_names(HASH_SKIP_NAMES);
        for entry in walker.walk() {
            let entry = entry?;
            let entry_path = path::join(prefix, &entry.relative_path);
            if !self.is_tracked(&entry_path) {
                continue;
            }
            let kind = if entry.is_file {
                NodeKind::File
            } else {
                NodeKind::Folder
            };
            on_disk.insert(entry_path, kind);
        }
        Ok(on_disk)
    }

    /// Fix name, parent link and file fingerprint of an existing record.
    fn repair(&self, mut node: FileSystemNode, report: &mut SyncReport) -> Result<(), ApiError> {
        let entry = node.path.clone();
        let mut changed = false;

        let expected_parent = self.parent_id_for(path::dirname(&entry))?;
        if node.parent_id != expected_parent {
            node.parent_id = expected_parent;
            report.reparented.push(entry.clone());
            changed = true;
        }
        if node.name != path::basename(&entry) {
            node.set_path(&entry);
            changed = true;
        }
        if node.kind == NodeKind::File {
            let location = self.fs.resolve(&entry);
            let hash = self.hasher.hash_file(&location)?;
            let size = self.hasher.size_of_file(&location)?;
            if node.hash != hash || node.size != size {
                node.hash = hash;
                node.size = size;
                report.mark_updated(&entry);
                changed = true;
            }
        }

        if changed {
            node.touch();
            self.store.save(&node)?;
        }
        Ok(())
    }
}
