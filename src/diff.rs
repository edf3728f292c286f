//! Diff Engine
//!
//! `diff(base, other)` is the tree of everything `other` adds or changes
//! relative to `base`. Entries present only in `base` are not represented.
//! Both trees are walked in lock-step and any pair of entries with equal
//! ContentIds is skipped without descending.

use crate::error::TreeError;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, Node};
use crate::types::ContentId;

pub fn diff(store: &NodeStore, base: ContentId, other: ContentId) -> Result<ContentId, TreeError> {
    let other_dir = store.require_directory(&other)?;
    if base == other {
        return Ok(store.put_directory(DirectoryNode::empty(
            other_dir.permissions,
            other_dir.mtime,
        )));
    }

    let base_dir = store.require_directory(&base)?;
    let changes = diff_directories(store, &base_dir, &other_dir)?;
    Ok(store.put_directory(changes))
}

/// Changed entries of `other` relative to `base`, carried in a directory with
/// `other`'s metadata.
fn diff_directories(
    store: &NodeStore,
    base: &DirectoryNode,
    other: &DirectoryNode,
) -> Result<DirectoryNode, TreeError> {
    let mut changes = DirectoryNode::empty(other.permissions, other.mtime);

    for (name, other_id) in other.entries.iter() {
        let Some(base_id) = base.get(name) else {
            changes.entries.insert(name.clone(), *other_id);
            continue;
        };
        if base_id == *other_id {
            continue;
        }

        let base_node = store.require(&base_id)?;
        let other_node = store.require(other_id)?;
        match (base_node.as_ref(), other_node.as_ref()) {
            (Node::Directory(base_child), Node::Directory(other_child)) => {
                let nested = diff_directories(store, base_child, other_child)?;
                let metadata_changed = base_child.permissions != other_child.permissions
                    || base_child.mtime != other_child.mtime;
                // A directory that only lost entries has nothing to contribute
                if !nested.is_empty() || metadata_changed {
                    changes
                        .entries
                        .insert(name.clone(), store.put_directory(nested));
                }
            }
            _ => {
                changes.entries.insert(name.clone(), *other_id);
            }
        }
    }

    Ok(changes)
}
