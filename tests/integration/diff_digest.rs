//! Integration tests for diff and digest

use super::test_utils::{all_paths, read, tree_of};
use arbor::{DirectoryCopyOptions, Engine, NewFileOptions};

#[test]
fn test_diff_with_self_is_empty() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a/b.txt", "b"), ("c.txt", "c")]);
    let delta = engine.diff(tree, tree).unwrap();
    assert!(all_paths(&engine, delta).is_empty());
}

#[test]
fn test_diff_from_empty_is_other() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a/b.txt", "b"), ("c.txt", "c")]);
    let delta = engine.diff(engine.scratch(), tree).unwrap();
    assert_eq!(delta, tree);
}

#[test]
fn test_diff_contains_additions_and_changes() {
    let engine = Engine::default();
    let base = tree_of(
        &engine,
        &[("keep.txt", "k"), ("lib/a.rs", "a1"), ("lib/b.rs", "b"), ("gone.txt", "g")],
    );
    let other = tree_of(
        &engine,
        &[("keep.txt", "k"), ("lib/a.rs", "a2"), ("lib/b.rs", "b"), ("new/n.txt", "n")],
    );

    let delta = engine.diff(base, other).unwrap();
    assert_eq!(all_paths(&engine, delta), vec!["lib", "lib/a.rs", "new", "new/n.txt"]);
    assert_eq!(read(&engine, delta, "lib/a.rs"), "a2");
}

#[test]
fn test_diff_kind_change_takes_other() {
    let engine = Engine::default();
    let base = tree_of(&engine, &[("x", "file")]);
    let other = tree_of(&engine, &[("x/inner.txt", "now a dir")]);
    let delta = engine.diff(base, other).unwrap();
    assert_eq!(all_paths(&engine, delta), vec!["x", "x/inner.txt"]);
}

#[test]
fn test_diff_applied_to_base_reproduces_other_without_removals() {
    let engine = Engine::default();
    let base = tree_of(&engine, &[("a.txt", "1"), ("dir/b.txt", "2")]);
    let other = tree_of(&engine, &[("a.txt", "1"), ("dir/b.txt", "3"), ("dir/c.txt", "4")]);

    let delta = engine.diff(base, other).unwrap();
    let patched = engine
        .with_directory(base, "/", delta, &DirectoryCopyOptions::default())
        .unwrap();
    assert_eq!(patched, other);
}

#[test]
fn test_diff_is_memoized() {
    let engine = Engine::default();
    let base = tree_of(&engine, &[("a", "a")]);
    let other = engine
        .with_new_file(base, "b", b"b", &NewFileOptions::default())
        .unwrap();
    let before = engine.cache_stats().hits;

    let first = engine.diff(base, other).unwrap();
    let second = engine.diff(base, other).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.cache_stats().hits, before + 1);
}

#[test]
fn test_digest_tracks_content() {
    let engine = Engine::default();
    let a = tree_of(&engine, &[("f", "1")]);
    let b = tree_of(&engine, &[("f", "2")]);
    assert_ne!(engine.digest(a), engine.digest(b));
    assert_eq!(engine.digest(a), engine.digest(tree_of(&engine, &[("f", "1")])));
}

#[test]
fn test_verify_counts_reachable_nodes() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a/x", "1"), ("b/y", "2")]);
    // root, a, b, x, y
    assert_eq!(engine.verify(tree).unwrap(), 5);
}
