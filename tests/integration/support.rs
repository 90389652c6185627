use std::fs;
use std::path::Path;

use dbafs::config::FilesConfig;
use dbafs::store::{FileSystemNode, FindOptions};
use dbafs::Dbafs;
use tempfile::TempDir;

/// Scratch workspace with an in-memory record store.
pub struct Workspace {
    pub temp: TempDir,
    pub dbafs: Dbafs,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_files(FilesConfig::default())
    }

    pub fn with_files(files: FilesConfig) -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(&files.upload_path)).unwrap();
        let dbafs = Dbafs::in_memory(temp.path(), &files).unwrap();
        Self { temp, dbafs }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write straight to disk, bypassing the record store.
    pub fn put(&self, path: &str, content: &[u8]) {
        let target = self.root().join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }

    pub fn record(&self, path: &str) -> Option<FileSystemNode> {
        self.dbafs
            .engine()
            .store()
            .find_by_path(path, FindOptions::uncached())
            .unwrap()
    }

    pub fn paths_under(&self, prefix: &str) -> Vec<String> {
        self.dbafs
            .engine()
            .store()
            .find_all_under_prefix(prefix)
            .unwrap()
            .into_iter()
            .map(|n| n.path)
            .collect()
    }

    pub fn all_paths(&self) -> Vec<String> {
        self.dbafs
            .engine()
            .store()
            .all()
            .unwrap()
            .into_iter()
            .map(|n| n.path)
            .collect()
    }
}

/// Every record's parent link points at the record of its parent path.
pub fn assert_parent_links(ws: &Workspace, upload_path: &str) {
    for node in ws.dbafs.engine().store().all().unwrap() {
        let parent = dbafs::path::dirname(&node.path);
        if parent == upload_path {
            assert_eq!(node.parent_id, None, "{} should hang off the root", node.path);
        } else {
            let parent_record = ws
                .record(parent)
                .unwrap_or_else(|| panic!("missing parent record for {}", node.path));
            assert_eq!(node.parent_id, Some(parent_record.id), "{}", node.path);
        }
    }
}
