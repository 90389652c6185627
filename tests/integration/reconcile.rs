use crate::integration::support::{assert_parent_links, Workspace};

#[test]
fn reconcile_adopts_files_written_behind_its_back() {
    let ws = Workspace::new();
    ws.put("files/docs/2024/report.pdf", b"pdf");
    ws.put("files/docs/readme.txt", b"hi");

    let report = ws.dbafs.reconcile("files").unwrap();
    assert_eq!(report.added.len(), 4);
    assert!(report.removed.is_empty());
    assert_parent_links(&ws, "files");

    let folder = ws.record("files/docs").unwrap();
    assert_eq!(folder.hash, ws.dbafs.folder("files/docs").unwrap().hash().unwrap());
    assert_eq!(folder.size, 5);
}

#[test]
fn reconcile_drops_records_for_vanished_entries() {
    let ws = Workspace::new();
    ws.dbafs.file("files/a/b.txt").unwrap().write(b"b").unwrap();
    ws.dbafs.file("files/a/c.txt").unwrap().write(b"c").unwrap();
    std::fs::remove_file(ws.root().join("files/a/b.txt")).unwrap();

    let report = ws.dbafs.reconcile("files").unwrap();
    assert_eq!(report.removed, vec!["files/a/b.txt"]);
    assert_eq!(report.updated, vec!["files/a"]);
    assert_eq!(ws.all_paths(), vec!["files/a", "files/a/c.txt"]);
}

#[test]
fn reconcile_repairs_wrong_parent_links() {
    let ws = Workspace::new();
    ws.dbafs.file("files/a/b.txt").unwrap().write(b"b").unwrap();
    ws.dbafs.folder("files/other").unwrap();

    let store = ws.dbafs.engine().store();
    let mut broken = ws.record("files/a/b.txt").unwrap();
    broken.parent_id = Some(ws.record("files/other").unwrap().id);
    store.save(&broken).unwrap();

    let report = ws.dbafs.reconcile("files").unwrap();
    assert_eq!(report.reparented, vec!["files/a/b.txt"]);
    assert_parent_links(&ws, "files");
}

#[test]
fn reconcile_replaces_record_of_changed_kind() {
    let ws = Workspace::new();
    ws.dbafs.file("files/thing").unwrap().write(b"was a file").unwrap();
    std::fs::remove_file(ws.root().join("files/thing")).unwrap();
    ws.put("files/thing/inside.txt", b"now a folder");

    let report = ws.dbafs.reconcile("files").unwrap();
    assert_eq!(report.removed, vec!["files/thing"]);
    assert_eq!(report.added, vec!["files/thing", "files/thing/inside.txt"]);
    assert!(ws.record("files/thing").unwrap().is_folder());
}

#[test]
fn reconcile_of_subtree_records_missing_ancestors() {
    let ws = Workspace::new();
    ws.put("files/x/y/z.txt", b"z");

    let report = ws.dbafs.reconcile("files/x/y").unwrap();
    assert_eq!(report.added, vec!["files/x", "files/x/y", "files/x/y/z.txt"]);
    assert_eq!(ws.record("files/x").unwrap().size, 1);
    assert_eq!(
        ws.all_paths(),
        vec!["files/x", "files/x/y", "files/x/y/z.txt"]
    );
    assert_parent_links(&ws, "files");
}

#[test]
fn reconcile_is_idempotent() {
    let ws = Workspace::new();
    ws.put("files/a/b/c.txt", b"c");
    ws.put("files/d.txt", b"d");
    ws.dbafs.reconcile("files").unwrap();
    assert!(ws.dbafs.reconcile("files").unwrap().is_clean());
}

#[test]
fn reconcile_outside_upload_path_does_nothing() {
    let ws = Workspace::new();
    ws.put("vendor/lib.js", b"js");
    assert!(ws.dbafs.reconcile("vendor").unwrap().is_clean());
    assert!(ws.all_paths().is_empty());
}
