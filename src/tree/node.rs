//! Immutable file and directory nodes.

use crate::tree::hasher;
use crate::types::{ContentId, Permissions, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A leaf holding file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub contents: Vec<u8>,
    pub permissions: Permissions,
    pub mtime: Timestamp,
}

/// A directory mapping entry names to child nodes.
///
/// Entries are name-sorted; that ordering is what hashing and enumeration use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub entries: BTreeMap<String, ContentId>,
    pub permissions: Permissions,
    pub mtime: Timestamp,
}

impl DirectoryNode {
    pub fn empty(permissions: Permissions, mtime: Timestamp) -> Self {
        Self {
            entries: BTreeMap::new(),
            permissions,
            mtime,
        }
    }

    pub fn get(&self, name: &str) -> Option<ContentId> {
        self.entries.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

/// Node kind without payload, for listings and walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl Node {
    /// Compute this node's content identifier.
    pub fn content_id(&self) -> ContentId {
        match self {
            Node::File(file) => hasher::compute_file_id(file),
            Node::Directory(dir) => hasher::compute_directory_id(dir),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn permissions(&self) -> Permissions {
        match self {
            Node::File(f) => f.permissions,
            Node::Directory(d) => d.permissions,
        }
    }

    pub fn mtime(&self) -> Timestamp {
        match self {
            Node::File(f) => f.mtime,
            Node::Directory(d) => d.mtime,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            Node::File(_) => None,
        }
    }

    /// Size accounted against the store: file bytes, zero for directories.
    pub fn stored_len(&self) -> u64 {
        match self {
            Node::File(f) => f.contents.len() as u64,
            Node::Directory(_) => 0,
        }
    }
}
