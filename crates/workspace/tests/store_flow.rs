use codeprep_workspace::{compose, format_tree, FileRecordStore, TreeNode, WorkspaceError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(temp.path().join("src/util")).expect("create dirs");
    std::fs::write(temp.path().join("src/main.rs"), "fn main() {}\n").expect("write main");
    std::fs::write(temp.path().join("src/util/io.rs"), "pub fn io() {}\n").expect("write io");
    std::fs::write(temp.path().join("Cargo.toml"), "[package]\n").expect("write manifest");
    temp
}

fn states(store: &FileRecordStore) -> Vec<bool> {
    store.records().iter().map(|r| r.disabled).collect()
}

#[test]
fn adding_twice_keeps_one_record() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));

    store.add_files(["src/main.rs"]).expect("first add");
    let report = store.add_files(["src/main.rs"]).expect("second add");

    assert_eq!(store.len(), 1);
    assert!(report.added.is_empty());
    assert_eq!(report.skipped, vec!["src/main.rs"]);
}

#[test]
fn adding_a_directory_tracks_its_files_only() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));

    let report = store.add_files(["src"]).expect("add dir");
    let mut keys = report.added.clone();
    keys.sort();
    assert_eq!(keys, vec!["src/main.rs", "src/util/io.rs"]);

    let tree = store.build_tree();
    assert_eq!(tree.len(), 1);
    assert!(matches!(&tree[0], TreeNode::Folder { label, .. } if label == "src"));
}

#[test]
fn folder_toggle_cycles_through_disabled_then_enabled() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));
    store
        .add_files(["src/main.rs", "src/util/io.rs"])
        .expect("add files");

    store.toggle_path("src/util/io.rs").expect("toggle leaf");
    assert_eq!(states(&store), vec![false, true]);

    let tree = store.build_tree();
    store.toggle(&tree[0]);
    assert_eq!(states(&store), vec![true, true]);

    store.toggle_path("src").expect("toggle folder");
    assert_eq!(states(&store), vec![false, false]);
}

#[test]
fn remove_and_clear() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));
    store.add_files(["Cargo.toml", "src"]).expect("add");

    let removed = store.remove_file("Cargo.toml").expect("remove");
    assert_eq!(removed.path, "Cargo.toml");
    assert!(matches!(
        store.remove_file("Cargo.toml"),
        Err(WorkspaceError::NotFound(_))
    ));

    store.clear_files();
    assert!(store.is_empty());
}

#[test]
fn file_tree_listing_is_sorted() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));
    store.add_files(["src/util/io.rs", "Cargo.toml", "src/main.rs"]).expect("add");

    assert_eq!(
        format_tree(store.records()),
        "Cargo.toml\nsrc\n  main.rs\n  util\n    io.rs\n"
    );
}

#[tokio::test]
async fn disabled_files_are_left_out_of_the_prompt() {
    let temp = project();
    let mut store = FileRecordStore::new(Some(temp.path().to_path_buf()));
    store.add_files(["src/main.rs", "Cargo.toml"]).expect("add");
    store.toggle_path("Cargo.toml").expect("toggle");

    let prompt = compose(&store.enabled_files(), Some("Thanks"))
        .await
        .expect("compose");

    assert_eq!(
        prompt.text,
        "```rust\n// src/main.rs\nfn main() {}\n```\n\nThanks\n\n\n"
    );
}
