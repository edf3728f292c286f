//! Integration tests for the arbor tree engine

mod concurrency;
mod diff_digest;
mod export_host;
mod mutation_semantics;
mod test_utils;
mod tree_determinism;
