use dbafs::config::FilesConfig;
use dbafs::ApiError;

use crate::integration::support::{assert_parent_links, Workspace};

fn seeded() -> Workspace {
    let ws = Workspace::new();
    ws.dbafs.file("files/a/b.txt").unwrap().write(b"bee").unwrap();
    ws.dbafs.file("files/a/sub/c.txt").unwrap().write(b"sea").unwrap();
    ws
}

#[test]
fn file_rename_into_missing_sibling_folder() {
    let ws = seeded();
    let file_before = ws.record("files/a/b.txt").unwrap();

    let mut file = ws.dbafs.file("files/a/b.txt").unwrap();
    file.rename_to("files/a2/b.txt").unwrap();
    assert_eq!(file.path(), "files/a2/b.txt");

    let a2 = ws.record("files/a2").unwrap();
    assert_eq!(a2.parent_id, None);
    let moved = ws.record("files/a2/b.txt").unwrap();
    assert_eq!(moved.id, file_before.id);
    assert_eq!(moved.parent_id, Some(a2.id));
    assert_eq!(a2.hash, ws.dbafs.folder("files/a2").unwrap().hash().unwrap());

    assert!(ws.record("files/a").is_some());
    assert!(ws.record("files/a/b.txt").is_none());
    assert_parent_links(&ws, "files");
}

#[test]
fn rename_there_and_back_restores_records() {
    let ws = seeded();
    let before: Vec<_> = ws
        .dbafs
        .engine()
        .store()
        .all()
        .unwrap()
        .into_iter()
        .map(|n| (n.id, n.path, n.parent_id, n.hash))
        .collect();

    ws.dbafs.engine().rename("files/a", "files/moved/deeper").unwrap();
    assert!(ws.root().join("files/moved/deeper/sub/c.txt").is_file());
    ws.dbafs.engine().rename("files/moved/deeper", "files/a").unwrap();

    let after: Vec<_> = ws
        .dbafs
        .engine()
        .store()
        .all()
        .unwrap()
        .into_iter()
        .filter(|n| !n.path.starts_with("files/moved"))
        .map(|n| (n.id, n.path, n.parent_id, n.hash))
        .collect();
    assert_eq!(before, after);
    assert_parent_links(&ws, "files");
}

#[test]
fn rename_onto_existing_target_fails_without_changes() {
    let ws = seeded();
    ws.dbafs.folder("files/other").unwrap();
    let result = ws.dbafs.engine().rename("files/a", "files/other");
    assert!(matches!(result, Err(ApiError::AlreadyExists(_))));
    assert!(ws.record("files/a/b.txt").is_some());
}

#[test]
fn rename_into_own_subtree_is_rejected() {
    let ws = seeded();
    let result = ws.dbafs.engine().rename("files/a", "files/a/inner");
    assert!(matches!(result, Err(ApiError::InvalidPath(_))));
}

#[test]
fn rename_out_of_upload_tree_drops_records() {
    let ws = seeded();
    ws.dbafs.engine().rename("files/a", "archive/a").unwrap();
    assert!(ws.all_paths().is_empty());
    assert!(ws.root().join("archive/a/sub/c.txt").is_file());
}

#[test]
fn rename_into_upload_tree_records_subtree() {
    let ws = Workspace::new();
    ws.put("incoming/batch/one.txt", b"1");
    ws.put("incoming/batch/two/three.txt", b"3");

    ws.dbafs
        .engine()
        .rename("incoming/batch", "files/batch")
        .unwrap();
    assert_eq!(
        ws.all_paths(),
        vec![
            "files/batch",
            "files/batch/one.txt",
            "files/batch/two",
            "files/batch/two/three.txt"
        ]
    );
    assert_parent_links(&ws, "files");
}

#[test]
fn copy_preserves_structure_and_hashes() {
    let ws = seeded();
    ws.dbafs.folder("files/a").unwrap().copy_to("files/copy").unwrap();

    let source: Vec<_> = ws
        .dbafs
        .engine()
        .store()
        .find_all_under_prefix("files/a")
        .unwrap();
    let copied: Vec<_> = ws
        .dbafs
        .engine()
        .store()
        .find_all_under_prefix("files/copy")
        .unwrap();
    assert_eq!(source.len(), copied.len());
    for (s, c) in source.iter().zip(copied.iter()) {
        assert_eq!(
            s.path.strip_prefix("files/a"),
            c.path.strip_prefix("files/copy")
        );
        assert_eq!(s.hash, c.hash);
        assert_eq!(s.kind, c.kind);
        assert_ne!(s.id, c.id);
    }
    assert_eq!(
        ws.record("files/a").unwrap().hash,
        ws.record("files/copy").unwrap().hash
    );
    assert!(ws.root().join("files/a/sub/c.txt").is_file());
    assert_parent_links(&ws, "files");
}

#[test]
fn copy_file_into_new_folder() {
    let ws = seeded();
    let copy = ws
        .dbafs
        .file("files/a/b.txt")
        .unwrap()
        .copy_to("files/z/b-copy.txt")
        .unwrap();
    assert!(copy.exists());
    let folder = ws.record("files/z").unwrap();
    assert_eq!(
        ws.record("files/z/b-copy.txt").unwrap().parent_id,
        Some(folder.id)
    );
}

fn with_excluded_target() -> Workspace {
    let ws = Workspace::with_files(FilesConfig {
        sync_exclude: vec!["b/private".to_string()],
        ..FilesConfig::default()
    });
    ws.put("files/a/keep.txt", b"keep");
    ws.put("files/a/private/x.txt", b"x");
    ws.dbafs.engine().add_resource("files/a").unwrap();
    assert!(ws.record("files/a/private/x.txt").is_some());
    ws
}

#[test]
fn folder_rename_drops_records_landing_in_excluded_paths() {
    let ws = with_excluded_target();
    let mut folder = ws.dbafs.folder("files/a").unwrap();
    folder.rename_to("files/b").unwrap();

    let mut paths = ws.all_paths();
    paths.sort();
    assert_eq!(paths, vec!["files/b", "files/b/keep.txt"]);
    assert!(ws.root().join("files/b/private/x.txt").is_file());
    assert_parent_links(&ws, "files");
}

#[test]
fn folder_copy_skips_records_landing_in_excluded_paths() {
    let ws = with_excluded_target();
    ws.dbafs.engine().copy_to("files/a", "files/b").unwrap();

    let mut copied = ws.paths_under("files/b");
    copied.sort();
    assert_eq!(copied, vec!["files/b/keep.txt"]);
    assert!(ws.record("files/b").is_some());
    assert!(ws.record("files/a/private/x.txt").is_some());
    assert!(ws.root().join("files/b/private/x.txt").is_file());
    assert_parent_links(&ws, "files");
}
