//! Integration tests for the mutation operations

use super::test_utils::{all_paths, read, tree_of};
use arbor::{
    CopyFileOptions, CopyFilter, DirectoryCopyOptions, Engine, NewDirectoryOptions,
    NewFileOptions, TreeError,
};

#[test]
fn test_with_new_file_roundtrip() {
    let engine = Engine::default();
    let tree = engine
        .with_new_file(engine.scratch(), "/a/b/c.txt", b"hello", &NewFileOptions::default())
        .unwrap();

    assert_eq!(read(&engine, tree, "a/b/c.txt"), "hello");
    let info = engine.stat(tree, "a/b/c.txt").unwrap();
    assert_eq!(info.permissions, 0o644);
    assert_eq!(info.mtime, 0);
    assert_eq!(engine.stat(tree, "a/b").unwrap().permissions, 0o755);
}

#[test]
fn test_with_new_file_through_file_is_invalid_path() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a.txt", "a")]);
    let result = engine.with_new_file(tree, "a.txt/b.txt", b"b", &NewFileOptions::default());
    assert!(matches!(result, Err(TreeError::InvalidPath { .. })));
}

#[test]
fn test_with_new_file_onto_directory_is_not_a_file() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("d/inner.txt", "x")]);
    let result = engine.with_new_file(tree, "d", b"b", &NewFileOptions::default());
    assert_eq!(result.unwrap_err(), TreeError::NotAFile("/d".to_string()));
}

#[test]
fn test_path_escaping_root_rejected() {
    let engine = Engine::default();
    let result = engine.with_new_file(engine.scratch(), "../x", b"", &NewFileOptions::default());
    assert!(matches!(result, Err(TreeError::InvalidPath { .. })));

    let inside = engine
        .with_new_file(engine.scratch(), "a/../b/./c", b"", &NewFileOptions::default())
        .unwrap();
    assert_eq!(all_paths(&engine, inside), vec!["b", "b/c"]);
}

#[test]
fn test_overwrite_file() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("f", "old")]);
    let tree = engine
        .with_new_file(tree, "f", b"new", &NewFileOptions::default())
        .unwrap();
    assert_eq!(read(&engine, tree, "f"), "new");
}

#[test]
fn test_with_files_places_by_basename() {
    let engine = Engine::default();
    let a = engine
        .new_file("/tmp/a.txt", "A", &NewFileOptions::default())
        .unwrap();
    let b = engine
        .new_file("b.txt", "B", &NewFileOptions::permissions(0o600))
        .unwrap();

    let tree = engine
        .with_files(engine.scratch(), "out", &[a, b], &CopyFileOptions::default())
        .unwrap();
    assert_eq!(all_paths(&engine, tree), vec!["out", "out/a.txt", "out/b.txt"]);
    assert_eq!(engine.stat(tree, "out/b.txt").unwrap().permissions, 0o600);
}

#[test]
fn test_with_file_preserves_permissions_unless_overridden() {
    let engine = Engine::default();
    let script = engine
        .new_file("run.sh", "#!/bin/sh", &NewFileOptions::permissions(0o755))
        .unwrap();

    let kept = engine
        .with_file(engine.scratch(), "bin/run.sh", &script, &CopyFileOptions::default())
        .unwrap();
    assert_eq!(engine.stat(kept, "bin/run.sh").unwrap().permissions, 0o755);

    let overridden = engine
        .with_file(
            engine.scratch(),
            "bin/run.sh",
            &script,
            &CopyFileOptions {
                permissions: Some(0o700),
            },
        )
        .unwrap();
    assert_eq!(engine.stat(overridden, "bin/run.sh").unwrap().permissions, 0o700);
}

#[test]
fn test_with_directory_merge_semantics() {
    let engine = Engine::default();
    let dest = tree_of(&engine, &[("app/keep.txt", "keep"), ("app/cfg/a.toml", "old")]);
    let source = tree_of(&engine, &[("cfg/a.toml", "new"), ("cfg/b.toml", "b")]);

    let merged = engine
        .with_directory(dest, "app", source, &DirectoryCopyOptions::default())
        .unwrap();
    assert_eq!(
        all_paths(&engine, merged),
        vec!["app", "app/cfg", "app/cfg/a.toml", "app/cfg/b.toml", "app/keep.txt"]
    );
    assert_eq!(read(&engine, merged, "app/cfg/a.toml"), "new");
}

#[test]
fn test_with_directory_onto_file_rejected() {
    let engine = Engine::default();
    let dest = tree_of(&engine, &[("app", "a file")]);
    let source = tree_of(&engine, &[("x", "x")]);
    let result = engine.with_directory(dest, "app", source, &DirectoryCopyOptions::default());
    assert_eq!(result.unwrap_err(), TreeError::NotADirectory("/app".to_string()));
}

#[test]
fn test_with_directory_at_root_merges_into_root() {
    let engine = Engine::default();
    let dest = tree_of(&engine, &[("a", "a")]);
    let source = tree_of(&engine, &[("b", "b")]);
    let merged = engine
        .with_directory(dest, "/", source, &DirectoryCopyOptions::default())
        .unwrap();
    assert_eq!(all_paths(&engine, merged), vec!["a", "b"]);
}

#[test]
fn test_with_directory_filtered() {
    let engine = Engine::default();
    let source = tree_of(
        &engine,
        &[("main.go", "m"), ("pkg/lib.go", "l"), ("vendor/x.go", "v"), ("README.md", "r")],
    );
    let options = DirectoryCopyOptions::filter(
        CopyFilter::new().include(["**/*.go"]).exclude(["vendor/"]),
    );
    let tree = engine
        .with_directory(engine.scratch(), "src", source, &options)
        .unwrap();
    assert_eq!(
        all_paths(&engine, tree),
        vec!["src", "src/main.go", "src/pkg", "src/pkg/lib.go"]
    );
}

#[test]
fn test_with_new_directory_semantics() {
    let engine = Engine::default();
    let tree = engine
        .with_new_directory(engine.scratch(), "a/b", &NewDirectoryOptions::permissions(0o700))
        .unwrap();
    assert_eq!(engine.stat(tree, "a/b").unwrap().permissions, 0o700);
    assert_eq!(engine.stat(tree, "a").unwrap().permissions, 0o755);

    let again = engine
        .with_new_directory(tree, "a/b", &NewDirectoryOptions::default())
        .unwrap();
    assert_eq!(tree, again);

    let with_file = tree_of(&engine, &[("f", "f")]);
    let result = engine.with_new_directory(with_file, "f", &NewDirectoryOptions::default());
    assert_eq!(result.unwrap_err(), TreeError::NotADirectory("/f".to_string()));
}

#[test]
fn test_without_variants() {
    let engine = Engine::default();
    let tree = tree_of(
        &engine,
        &[(".github/ci.yml", "ci"), ("src/a.rs", "a"), ("src/b.rs", "b"), ("README", "r")],
    );

    let removed = engine.without(tree, &["src/a.rs", "README", "missing"]).unwrap();
    assert_eq!(all_paths(&engine, removed), vec![".github", ".github/ci.yml", "src", "src/b.rs"]);

    let no_ci = engine.without_directory(removed, ".github").unwrap();
    assert_eq!(all_paths(&engine, no_ci), vec!["src", "src/b.rs"]);

    let unchanged = engine.without_file(no_ci, "nope.txt").unwrap();
    assert_eq!(unchanged, no_ci);

    let emptied = engine.without(no_ci, &["/"]).unwrap();
    assert_eq!(emptied, engine.scratch());
}

#[test]
fn test_with_timestamps_applies_everywhere() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a/b/c.txt", "c"), ("d.txt", "d")]);
    let stamped = engine.with_timestamps(tree, 1_700_000_000).unwrap();

    for path in all_paths(&engine, stamped) {
        assert_eq!(engine.stat(stamped, &path).unwrap().mtime, 1_700_000_000, "{}", path);
    }
    assert_eq!(engine.stat(stamped, "/").unwrap().mtime, 1_700_000_000);
}

#[test]
fn test_no_op_mutations_keep_identity() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("a.txt", "a")]);

    let same = engine
        .with_new_file(tree, "a.txt", b"a", &NewFileOptions::default())
        .unwrap();
    assert_eq!(same, tree);
    assert_eq!(engine.without(tree, &["ghost"]).unwrap(), tree);
}

#[test]
fn test_entries_listing() {
    let engine = Engine::default();
    let tree = tree_of(&engine, &[("z", "z"), ("a/x", "x"), ("m", "m")]);
    assert_eq!(engine.entries(tree, "").unwrap(), vec!["a", "m", "z"]);
    assert_eq!(
        engine.entries(tree, "missing").unwrap_err(),
        TreeError::NotFound("/missing".to_string())
    );
}
