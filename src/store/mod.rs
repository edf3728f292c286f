//! Node Store
//!
//! Content-addressed storage of immutable tree nodes. Every other component
//! holds `ContentId`s and goes through the store to reach node data.

use crate::error::TreeError;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use crate::types::ContentId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Session-scoped node store.
///
/// `put` is idempotent: identical content resolves to one stored `Arc<Node>`
/// no matter how many callers insert it, or how concurrently.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: RwLock<HashMap<ContentId, Arc<Node>>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ContentId) -> Option<Arc<Node>> {
        self.nodes.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.nodes.read().contains_key(id)
    }

    /// Insert a node and return its identifier.
    pub fn put(&self, node: Node) -> ContentId {
        let id = node.content_id();

        // Fast path: most puts during copy-on-write rebuilds hit existing nodes
        if self.nodes.read().contains_key(&id) {
            return id;
        }

        let mut nodes = self.nodes.write();
        nodes.entry(id).or_insert_with(|| {
            trace!(id = %id.short(), kind = ?node.kind(), "Stored new node");
            Arc::new(node)
        });
        id
    }

    pub fn put_file(&self, file: FileNode) -> ContentId {
        self.put(Node::File(file))
    }

    pub fn put_directory(&self, dir: DirectoryNode) -> ContentId {
        self.put(Node::Directory(dir))
    }

    /// Fetch a node that a tree is known to reference.
    pub fn require(&self, id: &ContentId) -> Result<Arc<Node>, TreeError> {
        self.get(id).ok_or(TreeError::MissingNode(*id))
    }

    pub fn require_directory(&self, id: &ContentId) -> Result<DirectoryNode, TreeError> {
        match self.require(id)?.as_ref() {
            Node::Directory(dir) => Ok(dir.clone()),
            Node::File(_) => Err(TreeError::NotADirectory(id.short())),
        }
    }

    /// Number of distinct nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Total file bytes held, counting each distinct file once.
    pub fn stored_bytes(&self) -> u64 {
        self.nodes.read().values().map(|n| n.stored_len()).sum()
    }
}
