//! arbor: Immutable Content-Addressed Directory Trees
//!
//! Trees are values identified by the BLAKE3 digest of their structure.
//! Every edit yields a new tree that shares all untouched subtrees with its
//! input; trees can be filtered, diffed, digested, loaded from and exported
//! to the host filesystem.

pub mod cache;
pub mod cli;
pub mod config;
pub mod diff;
pub mod digest;
pub mod engine;
pub mod error;
pub mod filter;
pub mod host;
pub mod logging;
pub mod mutation;
pub mod options;
pub mod query;
pub mod store;
pub mod tree;
pub mod types;

pub use engine::Engine;
pub use error::{ConfigError, HostError, TreeError};
pub use filter::CopyFilter;
pub use options::{
    CopyFileOptions, DirectoryCopyOptions, ExportOptions, LoadOptions, NewDirectoryOptions,
    NewFileOptions,
};
pub use tree::{FileRef, Tree};
pub use tokio_util::sync::CancellationToken;
pub use types::ContentId;
