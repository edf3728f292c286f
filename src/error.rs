//! Error types for the arbor tree engine.

use crate::types::ContentId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by path resolution, mutation, diff and digest.
///
/// These are deterministic for a given tree and argument set, so they are
/// `Clone` and may be memoized alongside successful results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid pattern {pattern:?}: {message}")]
    PatternSyntax { pattern: String, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node {0:?} missing from store")]
    MissingNode(ContentId),

    #[error("hash mismatch: expected {expected:?}, got {actual:?}")]
    HashMismatch {
        expected: ContentId,
        actual: ContentId,
    },
}

impl TreeError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        TreeError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while moving trees to or from the host filesystem.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host I/O error at {path:?}: {source}")]
    HostIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid destination {0:?}: exists and is not a directory")]
    InvalidDestination(PathBuf),

    #[error("invalid source {0:?}: not a directory")]
    InvalidSource(PathBuf),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::HostIo {
            path: path.into(),
            source,
        }
    }
}

/// Configuration and logging setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
