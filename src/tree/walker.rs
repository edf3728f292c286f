//! Depth-first traversal of stored trees

use crate::error::TreeError;
use crate::store::NodeStore;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path::TreePath;
use crate::types::ContentId;

/// A node reached during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walk root
    pub path: TreePath,
    pub id: ContentId,
    pub kind: NodeKind,
}

/// Tree walker
///
/// Yields entries in pre-order with siblings sorted by name, so the sequence
/// is a pure function of the tree.
pub struct Walker<'a> {
    store: &'a NodeStore,
}

impl<'a> Walker<'a> {
    pub fn new(store: &'a NodeStore) -> Self {
        Self { store }
    }

    /// Walk every entry below `root` (the root itself is not reported)
    pub fn walk(&self, root: ContentId) -> Result<Vec<WalkEntry>, TreeError> {
        let mut entries = Vec::new();
        self.walk_dir(root, &TreePath::root(), &mut entries)?;
        Ok(entries)
    }

    fn walk_dir(
        &self,
        dir_id: ContentId,
        prefix: &TreePath,
        out: &mut Vec<WalkEntry>,
    ) -> Result<(), TreeError> {
        let dir = self.store.require_directory(&dir_id)?;
        for (name, child) in dir.entries.iter() {
            let node = self.store.require(child)?;
            let path = prefix.join(name);
            out.push(WalkEntry {
                path: path.clone(),
                id: *child,
                kind: node.kind(),
            });
            if let Node::Directory(_) = node.as_ref() {
                self.walk_dir(*child, &path, out)?;
            }
        }
        Ok(())
    }
}
