//! Shared test utilities for integration tests

use arbor::{Engine, NewFileOptions, Tree};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that change process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Build a tree from `(path, contents)` pairs with default options.
pub fn tree_of(engine: &Engine, files: &[(&str, &str)]) -> Tree {
    files.iter().fold(engine.scratch(), |tree, (path, contents)| {
        engine
            .with_new_file(tree, path, contents.as_bytes(), &NewFileOptions::default())
            .unwrap()
    })
}

/// Every path of `tree`, depth-first and lexicographic.
pub fn all_paths(engine: &Engine, tree: Tree) -> Vec<String> {
    engine.glob(tree, "**").unwrap()
}

pub fn read(engine: &Engine, tree: Tree, path: &str) -> String {
    let file = engine.file(tree, path).unwrap();
    String::from_utf8(engine.file_contents(&file).unwrap()).unwrap()
}

/// Run `f` with `XDG_CONFIG_HOME` and `HOME` pointed into `test_dir`,
/// restoring both afterwards.
pub fn with_config_home<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let home = std::env::var_os("HOME");
    let xdg = std::env::var_os("XDG_CONFIG_HOME");

    std::env::set_var("HOME", test_dir.path().join("home"));
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());

    let result = f();

    match home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    match xdg {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    result
}
