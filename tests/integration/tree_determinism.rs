//! Integration tests for content addressing and determinism

use super::test_utils::{all_paths, tree_of};
use arbor::{Engine, NewDirectoryOptions, NewFileOptions};

/// Same content built in a different order yields the same tree
#[test]
fn test_insertion_order_irrelevant() {
    let engine = Engine::default();
    let a = tree_of(&engine, &[("x/1.txt", "1"), ("y.txt", "y"), ("x/2.txt", "2")]);
    let b = tree_of(&engine, &[("y.txt", "y"), ("x/2.txt", "2"), ("x/1.txt", "1")]);
    assert_eq!(a, b);
    assert_eq!(engine.digest(a), engine.digest(b));
}

/// Separate sessions agree on identity
#[test]
fn test_identity_across_engines() {
    let first = Engine::default();
    let second = Engine::default();
    let a = tree_of(&first, &[("a/b/c.txt", "deep")]);
    let b = tree_of(&second, &[("a/b/c.txt", "deep")]);
    assert_eq!(a.root(), b.root());
}

/// Every kind of change produces a different root
#[test]
fn test_changes_alter_root() {
    let engine = Engine::default();
    let base = tree_of(&engine, &[("f.txt", "content")]);

    let content = tree_of(&engine, &[("f.txt", "other")]);
    let renamed = tree_of(&engine, &[("g.txt", "content")]);
    let mode = engine
        .with_new_file(engine.scratch(), "f.txt", b"content", &NewFileOptions::permissions(0o600))
        .unwrap();
    let stamped = engine.with_timestamps(base, 42).unwrap();

    for changed in [content, renamed, mode, stamped] {
        assert_ne!(base, changed);
    }
}

/// Identical files stored at many paths occupy one node
#[test]
fn test_dedup_shared_content() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a/same.txt", "dup"), ("b/same.txt", "dup")]);
    let before = engine.store().len();

    let again = tree_of(&engine, &[("a/same.txt", "dup"), ("b/same.txt", "dup")]);
    assert_eq!(tree, again);
    assert_eq!(engine.store().len(), before);

    // Both directories hash the same, so one node serves both
    let a = engine.directory(tree, "a").unwrap();
    let b = engine.directory(tree, "b").unwrap();
    assert_eq!(a, b);
}

/// Trees are immutable: old handles still see old content
#[test]
fn test_old_tree_unchanged_after_edit() {
    let engine = Engine::default();
    let v1 = tree_of(&engine, &[("a.txt", "v1")]);
    let v2 = engine
        .with_new_file(v1, "a.txt", b"v2", &NewFileOptions::default())
        .unwrap();
    let v3 = engine
        .with_new_directory(v2, "logs", &NewDirectoryOptions::default())
        .unwrap();

    assert_eq!(super::test_utils::read(&engine, v1, "a.txt"), "v1");
    assert_eq!(all_paths(&engine, v1), vec!["a.txt"]);
    assert_eq!(all_paths(&engine, v3), vec!["a.txt", "logs"]);
    assert!(engine.verify(v1).is_ok());
}

#[test]
fn test_digest_format() {
    let engine = Engine::default();
    let digest = engine.digest(engine.scratch());
    let hex = digest.strip_prefix("blake3:").unwrap();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
}
