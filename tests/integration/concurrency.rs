//! Integration tests for concurrent use of one engine

use super::test_utils::{all_paths, tree_of};
use arbor::{Engine, NewFileOptions};
use std::sync::Arc;
use std::thread;

/// Many threads building the same trees converge on the same roots and nodes
#[test]
fn test_concurrent_identical_edits_converge() {
    let engine = Arc::new(Engine::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || tree_of(&engine, &[("a/b.txt", "b"), ("c.txt", "c")]))
        })
        .collect();

    let roots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(roots.windows(2).all(|w| w[0] == w[1]));

    let single = Engine::default();
    tree_of(&single, &[("a/b.txt", "b"), ("c.txt", "c")]);
    assert_eq!(engine.store().len(), single.store().len());
}

/// Concurrent identical requests are computed once
#[test]
fn test_concurrent_identical_requests_single_computation() {
    let engine = Arc::new(Engine::default());
    let base = tree_of(&engine, &[("x", "x")]);
    let before = engine.cache_stats();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.with_timestamps(base, 99).unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));

    let after = engine.cache_stats();
    assert_eq!(after.computations - before.computations, 1);
    assert_eq!(after.hits - before.hits, 15);
}

/// Independent edits from many threads all land in their own trees
#[test]
fn test_concurrent_distinct_edits() {
    let engine = Arc::new(Engine::default());
    let base = engine.scratch();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .with_new_file(base, &format!("f{}.txt", i), b"x", &NewFileOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let tree = handle.join().unwrap();
        assert_eq!(all_paths(&engine, tree), vec![format!("f{}.txt", i)]);
    }
    assert!(all_paths(&engine, base).is_empty());
}
