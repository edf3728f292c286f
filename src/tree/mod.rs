//! Immutable Directory Trees
//!
//! A tree is the ContentId of a root directory node in a [`NodeStore`]. Trees
//! are values: editing one always yields a new root that shares every
//! untouched subtree with the original.
//!
//! [`NodeStore`]: crate::store::NodeStore

pub mod hasher;
pub mod node;
pub mod path;
pub mod resolver;
pub mod walker;

use crate::types::ContentId;

/// Handle to an immutable directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tree {
    root: ContentId,
}

impl Tree {
    pub(crate) fn from_root(root: ContentId) -> Self {
        Self { root }
    }

    /// ContentId of the root directory node.
    pub fn root(&self) -> ContentId {
        self.root
    }
}

/// Handle to an immutable file node together with its basename.
///
/// The name only matters when the file is placed into a directory by
/// basename; it does not participate in the file's ContentId.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    id: ContentId,
    name: String,
}

impl FileRef {
    pub(crate) fn new(id: ContentId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
