use std::fs;
use std::path::Path;

use dbafs::config::FilesConfig;
use dbafs::tree::HashEngine;
use proptest::prelude::*;
use tempfile::TempDir;

use crate::integration::support::Workspace;

fn materialize(root: &Path, files: &[(String, Vec<u8>)]) {
    for (name, content) in files {
        let target = root.join(name);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn folder_hash_ignores_creation_order(
        entries in prop::collection::btree_map(
            "[a-z]{1,4}(/[a-z]{1,4})?",
            prop::collection::vec(any::<u8>(), 0..24),
            1..6,
        )
    ) {
        // A name used both as file and as directory cannot be materialized.
        let names: Vec<&String> = entries.keys().collect();
        let clash = names.iter().any(|a| names.iter().any(|b| b.starts_with(&format!("{}/", a))));
        prop_assume!(!clash);

        let forward: Vec<(String, Vec<u8>)> = entries.clone().into_iter().collect();
        let mut backward = forward.clone();
        backward.reverse();

        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        materialize(first.path(), &forward);
        materialize(second.path(), &backward);

        let engine = HashEngine::new();
        prop_assert_eq!(
            engine.hash_folder(first.path()).unwrap(),
            engine.hash_folder(second.path()).unwrap()
        );
    }
}

#[test]
fn file_hash_is_stable() {
    let ws = Workspace::new();
    let file = ws.dbafs.file("files/stable.txt").unwrap();
    file.write(b"same bytes").unwrap();
    assert_eq!(file.hash().unwrap(), file.hash().unwrap());
    assert_eq!(
        file.hash().unwrap(),
        ws.record("files/stable.txt").unwrap().hash
    );
}

#[test]
fn ds_store_does_not_affect_folder_hash() {
    let ws = Workspace::new();
    ws.dbafs.file("files/pics/a.jpg").unwrap().write(b"jpg").unwrap();
    let before = ws.dbafs.folder("files/pics").unwrap().hash().unwrap();
    ws.put("files/pics/.DS_Store", b"finder junk");
    assert_eq!(ws.dbafs.folder("files/pics").unwrap().hash().unwrap(), before);
}

#[test]
fn oversized_file_degrades_every_ancestor() {
    let files = FilesConfig {
        size_limit: 16,
        ..Default::default()
    };
    let ws = Workspace::with_files(files);
    ws.dbafs.file("files/x/ok.txt").unwrap().write(b"fine").unwrap();
    ws.dbafs
        .file("files/x/y/huge.bin")
        .unwrap()
        .write(&[7u8; 64])
        .unwrap();

    assert!(ws.record("files/x/y/huge.bin").unwrap().hash.is_unhashable());
    assert!(!ws.record("files/x/ok.txt").unwrap().hash.is_unhashable());
    assert!(ws.record("files/x/y").unwrap().hash.is_unhashable());
    assert!(ws.record("files/x").unwrap().hash.is_unhashable());
    assert_eq!(ws.record("files/x").unwrap().size, 68);
}

#[test]
fn digest_file_reports_oversized_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("big.bin");
    fs::write(&path, [0u8; 32]).unwrap();
    let engine = HashEngine::with_size_limit(32);
    assert!(matches!(
        engine.digest_file(&path),
        Err(dbafs::ApiError::UnhashableResource { size: 32, .. })
    ));
    assert!(engine.hash_file(&path).unwrap().is_unhashable());
}
