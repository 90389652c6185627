//! Path synchronization policy
//!
//! Decides whether a relative path is tracked in the record store at all.

use crate::config::FilesConfig;
use crate::path;

/// Upload root value that disables synchronization entirely.
pub const TEMPLATES_ROOT: &str = "templates";

#[derive(Debug, Clone)]
pub struct PathPolicy {
    upload_path: String,
    /// Excluded prefixes, already joined onto the upload path.
    excluded: Vec<String>,
}

impl PathPolicy {
    pub fn new(upload_path: impl Into<String>, sync_exclude: &[String]) -> Self {
        let upload_path = upload_path.into().trim_matches('/').to_string();
        let excluded = sync_exclude
            .iter()
            .map(|e| e.trim().trim_matches('/'))
            .filter(|e| !e.is_empty())
            .map(|e| path::join(&upload_path, e))
            .collect();
        Self {
            upload_path,
            excluded,
        }
    }

    pub fn from_config(files: &FilesConfig) -> Self {
        Self::new(files.upload_path.clone(), &files.sync_exclude)
    }

    pub fn upload_path(&self) -> &str {
        &self.upload_path
    }

    pub fn is_upload_root(&self, relative_path: &str) -> bool {
        relative_path == self.upload_path
    }

    pub fn should_sync(&self, relative_path: &str) -> bool {
        if self.upload_path == TEMPLATES_ROOT || self.upload_path.is_empty() {
            return false;
        }
        if !path::is_within(relative_path, &self.upload_path) {
            return false;
        }
        !self
            .excluded
            .iter()
            .any(|exempt| path::is_within(relative_path, exempt))
    }
}
