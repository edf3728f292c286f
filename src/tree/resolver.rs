//! Path resolution over stored trees.
//!
//! Reads walk directory entries from the root. Writes collect the chain of
//! parent directories down to the target, then [`ParentChain::commit`]
//! re-stores that chain bottom-up, which is the only place copy-on-write
//! happens.

use crate::error::TreeError;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, Node};
use crate::tree::path::TreePath;
use crate::types::{ContentId, Permissions, Timestamp};
use std::sync::Arc;

/// Metadata for directories created implicitly along a write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDefaults {
    pub dir_permissions: Permissions,
    pub mtime: Timestamp,
}

/// Resolve `path` to the node it names.
///
/// Fails with `NotFound` if a segment is absent and `NotADirectory` if a
/// non-final segment names a file.
pub fn resolve(
    store: &NodeStore,
    root: ContentId,
    path: &TreePath,
) -> Result<(ContentId, Arc<Node>), TreeError> {
    let mut current = root;
    let mut node = store.require(&current)?;

    for (depth, name) in path.components().iter().enumerate() {
        let dir = match node.as_ref() {
            Node::Directory(dir) => dir,
            Node::File(_) => return Err(TreeError::NotADirectory(prefix(path, depth))),
        };
        current = dir
            .get(name)
            .ok_or_else(|| TreeError::NotFound(prefix(path, depth + 1)))?;
        node = store.require(&current)?;
    }

    Ok((current, node))
}

/// Resolve `path` and require a directory there.
pub fn resolve_directory(
    store: &NodeStore,
    root: ContentId,
    path: &TreePath,
) -> Result<(ContentId, DirectoryNode), TreeError> {
    let (id, node) = resolve(store, root, path)?;
    match node.as_ref() {
        Node::Directory(dir) => Ok((id, dir.clone())),
        Node::File(_) => Err(TreeError::NotADirectory(path.to_string())),
    }
}

fn prefix(path: &TreePath, depth: usize) -> String {
    format!("/{}", path.components()[..depth].join("/"))
}

/// Directories from the root down to the parent of a write target.
#[derive(Debug, Clone)]
pub struct ParentChain {
    root: ContentId,
    /// Each level is a directory and the entry name followed inside it; the
    /// last level's name is the target itself.
    levels: Vec<(DirectoryNode, String)>,
}

impl ParentChain {
    /// Walk to the parent of `path`, creating missing intermediate
    /// directories with `defaults`.
    ///
    /// `path` must not be the root. Traversing through a file is `InvalidPath`.
    pub fn resolve_or_create(
        store: &NodeStore,
        root: ContentId,
        path: &TreePath,
        defaults: NodeDefaults,
    ) -> Result<Self, TreeError> {
        let components = path.components();
        let Some((target, parents)) = components.split_last() else {
            return Err(TreeError::invalid_path("/", "operation needs a path below the root"));
        };

        let mut levels = Vec::with_capacity(components.len());
        let mut dir = store.require_directory(&root)?;

        for (depth, name) in parents.iter().enumerate() {
            let next = match dir.get(name) {
                Some(child) => match store.require(&child)?.as_ref() {
                    Node::Directory(child_dir) => child_dir.clone(),
                    Node::File(_) => {
                        return Err(TreeError::invalid_path(
                            &path.to_string(),
                            format!("{} is a file", prefix(path, depth + 1)),
                        ))
                    }
                },
                None => DirectoryNode::empty(defaults.dir_permissions, defaults.mtime),
            };
            levels.push((dir, name.clone()));
            dir = next;
        }
        levels.push((dir, target.clone()));

        Ok(Self { root, levels })
    }

    /// Walk to the parent of `path` without creating anything.
    ///
    /// Returns `None` when an intermediate directory is missing or is a file.
    pub fn resolve_existing(
        store: &NodeStore,
        root: ContentId,
        path: &TreePath,
    ) -> Result<Option<Self>, TreeError> {
        let components = path.components();
        let Some((target, parents)) = components.split_last() else {
            return Ok(None);
        };

        let mut levels = Vec::with_capacity(components.len());
        let mut dir = store.require_directory(&root)?;

        for name in parents {
            let Some(child) = dir.get(name) else {
                return Ok(None);
            };
            let next = match store.require(&child)?.as_ref() {
                Node::Directory(child_dir) => child_dir.clone(),
                Node::File(_) => return Ok(None),
            };
            levels.push((dir, name.clone()));
            dir = next;
        }
        levels.push((dir, target.clone()));

        Ok(Some(Self { root, levels }))
    }

    /// Current entry at the target name, if any.
    pub fn target(&self) -> Option<ContentId> {
        self.levels
            .last()
            .and_then(|(dir, name)| dir.get(name))
    }

    pub fn target_name(&self) -> &str {
        self.levels
            .last()
            .map(|(_, name)| name.as_str())
            .unwrap_or_default()
    }

    /// Replace (`Some`) or remove (`None`) the target and store the rebuilt
    /// parent directories, returning the new root.
    pub fn commit(self, store: &NodeStore, replacement: Option<ContentId>) -> ContentId {
        let mut child = replacement;
        let mut rebuilt = None;

        for (mut dir, name) in self.levels.into_iter().rev() {
            match child {
                Some(id) => {
                    dir.entries.insert(name, id);
                }
                None => {
                    dir.entries.remove(&name);
                }
            }
            let id = store.put_directory(dir);
            child = Some(id);
            rebuilt = Some(id);
        }

        rebuilt.unwrap_or(self.root)
    }
}
