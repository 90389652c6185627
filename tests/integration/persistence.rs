use std::sync::Arc;

use dbafs::config::{DbafsConfig, FilesConfig};
use dbafs::store::{
    CachedRecordStore, FindOptions, MemoryRecordStore, RecordStore, SledRecordStore,
};
use dbafs::types::NodeKind;
use dbafs::{Dbafs, StorageError};
use tempfile::TempDir;

#[test]
fn sled_store_survives_reopen_through_dbafs() {
    let temp = TempDir::new().unwrap();
    let mut config = DbafsConfig::default();
    config.storage.store_path = "state/records".into();

    {
        let dbafs = Dbafs::open(temp.path(), &config).unwrap();
        dbafs.file("files/a/b.txt").unwrap().write(b"b").unwrap();
        dbafs.engine().rename("files/a", "files/c").unwrap();
        dbafs.flush().unwrap();
    }

    let dbafs = Dbafs::open(temp.path(), &config).unwrap();
    let store = dbafs.engine().store();
    let paths: Vec<String> = store.all().unwrap().into_iter().map(|n| n.path).collect();
    assert_eq!(paths, vec!["files/c", "files/c/b.txt"]);
    assert!(dbafs.reconcile("files").unwrap().is_clean());
}

#[test]
fn stale_version_is_rejected() {
    let store = MemoryRecordStore::new("files");
    let node = store.create("files/a.txt", NodeKind::File).unwrap();

    let mut first = node.clone();
    first.size = 1;
    store.save(&first).unwrap();

    let mut second = node;
    second.size = 2;
    assert!(matches!(
        store.save(&second),
        Err(StorageError::VersionConflict { .. })
    ));
}

#[test]
fn cached_store_serves_fresh_data_when_uncached() {
    let temp = TempDir::new().unwrap();
    let sled_store = SledRecordStore::open(&temp.path().join("db"), "files").unwrap();
    let store = CachedRecordStore::new(sled_store);
    let created = store.create("files/x", NodeKind::Folder).unwrap();

    let cached = store
        .find_by_path("files/x", FindOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(cached.id, created.id);

    let mut renamed = cached.clone();
    renamed.set_path("files/y");
    store.save(&renamed).unwrap();

    assert!(store
        .find_by_path("files/x", FindOptions::uncached())
        .unwrap()
        .is_none());
    let fresh = store
        .find_by_path("files/y", FindOptions::uncached())
        .unwrap()
        .unwrap();
    assert_eq!(fresh.version, 1);
}

#[test]
fn engine_works_over_any_record_store() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("files")).unwrap();
    let files = FilesConfig::default();
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new("files"));
    let dbafs = Dbafs::with_store(temp.path(), &files, store.clone()).unwrap();

    dbafs.folder("files/shared").unwrap();
    assert!(store
        .find_by_path("files/shared", FindOptions::default())
        .unwrap()
        .is_some());
}
