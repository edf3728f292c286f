//! Integration tests for exporting trees to the host filesystem

use super::test_utils::tree_of;
use arbor::{CancellationToken, Engine, ExportOptions, HostError, NewFileOptions};
use std::fs;
use tempfile::TempDir;

fn export(engine: &Engine, tree: arbor::Tree, dest: &std::path::Path, options: ExportOptions) {
    engine
        .export(tree, dest, &options, &CancellationToken::new())
        .unwrap();
}

#[test]
fn test_merge_keeps_host_only_entries() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path();
    fs::write(dest.join("local.txt"), "mine").unwrap();
    fs::write(dest.join("shared.txt"), "stale").unwrap();

    let tree = tree_of(&engine, &[("shared.txt", "fresh"), ("dir/new.txt", "new")]);
    export(&engine, tree, dest, ExportOptions::merge());

    assert_eq!(fs::read_to_string(dest.join("local.txt")).unwrap(), "mine");
    assert_eq!(fs::read_to_string(dest.join("shared.txt")).unwrap(), "fresh");
    assert_eq!(fs::read_to_string(dest.join("dir/new.txt")).unwrap(), "new");
}

#[test]
fn test_wipe_mirrors_tree() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path();
    fs::create_dir_all(dest.join("old/nested")).unwrap();
    fs::write(dest.join("old/nested/x"), "x").unwrap();
    fs::write(dest.join("local.txt"), "mine").unwrap();

    let tree = tree_of(&engine, &[("keep/a.txt", "a")]);
    export(&engine, tree, dest, ExportOptions::wipe());

    let mut names: Vec<_> = fs::read_dir(dest)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["keep"]);
}

#[test]
fn test_wipe_then_load_reproduces_digest() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let tree = tree_of(&engine, &[("a/b/c.txt", "c"), ("d.txt", "d")]);
    let tree = engine.with_timestamps(tree, 1_600_000_000).unwrap();
    fs::write(temp_dir.path().join("extra"), "e").unwrap();

    export(&engine, tree, temp_dir.path(), ExportOptions::wipe());
    let loaded = engine.load(temp_dir.path(), &Default::default()).unwrap();

    assert_eq!(
        engine.glob(loaded, "**").unwrap(),
        engine.glob(tree, "**").unwrap()
    );
    // Permissions and mtimes survive the round trip, so the whole tree matches
    #[cfg(unix)]
    assert_eq!(engine.digest(loaded), engine.digest(tree));
}

#[cfg(unix)]
#[test]
fn test_export_applies_permissions_and_mtime() {
    use std::os::unix::fs::PermissionsExt;

    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let tree = engine
        .with_new_file(
            engine.scratch(),
            "bin/tool",
            b"#!/bin/sh",
            &NewFileOptions::permissions(0o750),
        )
        .unwrap();
    let tree = engine.with_timestamps(tree, 1_234_567_890).unwrap();
    export(&engine, tree, temp_dir.path(), ExportOptions::default());

    let meta = fs::metadata(temp_dir.path().join("bin/tool")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o7777, 0o750);
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    assert_eq!(mtime.unix_seconds(), 1_234_567_890);

    let dir_meta = fs::metadata(temp_dir.path().join("bin")).unwrap();
    assert_eq!(
        filetime::FileTime::from_last_modification_time(&dir_meta).unix_seconds(),
        1_234_567_890
    );
}

#[test]
fn test_type_conflicts_replaced_in_merge_mode() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path();
    fs::write(dest.join("was_file"), "f").unwrap();
    fs::create_dir_all(dest.join("was_dir/sub")).unwrap();

    let tree = tree_of(&engine, &[("was_file/inner.txt", "i"), ("was_dir", "now a file")]);
    export(&engine, tree, dest, ExportOptions::merge());

    assert!(dest.join("was_file").is_dir());
    assert_eq!(fs::read_to_string(dest.join("was_dir")).unwrap(), "now a file");
}

#[test]
fn test_destination_must_be_directory() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("target");
    fs::write(&file, "x").unwrap();

    let result = engine.export(
        engine.scratch(),
        &file,
        &ExportOptions::default(),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(HostError::InvalidDestination(_))));
}

#[test]
fn test_cancelled_export_reports_cancelled() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let tree = tree_of(&engine, &[("a", "a")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = engine.export(tree, temp_dir.path(), &ExportOptions::default(), &cancel);
    assert!(matches!(result, Err(HostError::Cancelled)));
}

#[test]
fn test_export_returns_canonical_path() {
    let engine = Engine::default();
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("out/./nested");
    let written = engine
        .export(engine.scratch(), &dest, &ExportOptions::default(), &CancellationToken::new())
        .unwrap();
    assert!(written.is_absolute());
    assert!(written.ends_with("out/nested"));
}
