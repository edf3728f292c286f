//! Read-only queries over stored trees: listing, globbing and stat.

use crate::error::TreeError;
use crate::filter::PatternSet;
use crate::store::NodeStore;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path::TreePath;
use crate::tree::resolver::{resolve, resolve_directory};
use crate::tree::walker::Walker;
use crate::types::{ContentId, Permissions, Timestamp};
use serde::Serialize;

/// Metadata of one tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub id: ContentId,
    pub kind: NodeKind,
    /// Length in bytes for files, number of entries for directories
    pub size: u64,
    pub permissions: Permissions,
    pub mtime: Timestamp,
}

/// Names of the immediate children of the directory at `path`, sorted.
pub fn entries(
    store: &NodeStore,
    root: ContentId,
    path: &TreePath,
) -> Result<Vec<String>, TreeError> {
    let (_, dir) = resolve_directory(store, root, path)?;
    Ok(dir.entries.into_keys().collect())
}

/// Relative paths of every file and directory matching `pattern`, in
/// depth-first lexicographic order.
pub fn glob(store: &NodeStore, root: ContentId, pattern: &str) -> Result<Vec<String>, TreeError> {
    let patterns = PatternSet::single(pattern)?;
    let matched = Walker::new(store)
        .walk(root)?
        .into_iter()
        .map(|entry| entry.path.to_relative_string())
        .filter(|relative| patterns.is_match(relative))
        .collect();
    Ok(matched)
}

pub fn stat(store: &NodeStore, root: ContentId, path: &TreePath) -> Result<EntryInfo, TreeError> {
    let (id, node) = resolve(store, root, path)?;
    let size = match node.as_ref() {
        Node::File(file) => file.contents.len() as u64,
        Node::Directory(dir) => dir.entries.len() as u64,
    };
    Ok(EntryInfo {
        id,
        kind: node.kind(),
        size,
        permissions: node.permissions(),
        mtime: node.mtime(),
    })
}
