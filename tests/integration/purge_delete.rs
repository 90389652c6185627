use crate::integration::support::{assert_parent_links, Workspace};

fn seeded() -> Workspace {
    let ws = Workspace::new();
    ws.dbafs.file("files/p/a/one.txt").unwrap().write(b"1").unwrap();
    ws.dbafs.file("files/p/a/deep/two.txt").unwrap().write(b"22").unwrap();
    ws.dbafs.file("files/p/keep.txt").unwrap().write(b"keep").unwrap();
    ws
}

#[test]
fn purge_empties_folder_and_its_records() {
    let ws = seeded();
    let folder = ws.dbafs.folder("files/p/a").unwrap();
    folder.purge().unwrap();

    assert!(ws.paths_under("files/p/a").is_empty());
    assert!(ws.root().join("files/p/a").is_dir());
    assert!(folder.is_empty().unwrap());

    let record = ws.record("files/p/a").unwrap();
    assert_eq!(record.size, 0);
    assert_eq!(ws.record("files/p").unwrap().size, 4);
    assert_parent_links(&ws, "files");
}

#[test]
fn delete_removes_directory_and_records() {
    let ws = seeded();
    ws.dbafs.folder("files/p/a").unwrap().delete().unwrap();

    assert!(ws.record("files/p/a").is_none());
    assert!(ws.paths_under("files/p/a").is_empty());
    assert!(!ws.root().join("files/p/a").exists());
    assert_eq!(ws.paths_under("files/p"), vec!["files/p/keep.txt"]);
    assert_eq!(
        ws.record("files/p").unwrap().hash,
        ws.dbafs.folder("files/p").unwrap().hash().unwrap()
    );
}

#[test]
fn delete_does_not_touch_prefix_siblings() {
    let ws = seeded();
    ws.dbafs.file("files/p/ab.txt").unwrap().write(b"ab").unwrap();
    ws.dbafs.engine().delete("files/p/a").unwrap();
    assert!(ws.record("files/p/ab.txt").is_some());
}

#[test]
fn file_delete_updates_parent_size() {
    let ws = seeded();
    ws.dbafs.file("files/p/keep.txt").unwrap().delete().unwrap();
    assert!(ws.record("files/p/keep.txt").is_none());
    assert_eq!(ws.record("files/p").unwrap().size, 3);
}

#[test]
fn purge_of_unsynced_folder_only_touches_disk() {
    let ws = seeded();
    ws.put("cache/x/y.bin", b"y");
    let before = ws.all_paths();
    ws.dbafs.folder("cache").unwrap().purge().unwrap();
    assert!(ws.root().join("cache").is_dir());
    assert!(!ws.root().join("cache/x").exists());
    assert_eq!(ws.all_paths(), before);
}
