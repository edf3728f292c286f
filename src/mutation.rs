//! Mutation Engine
//!
//! Pure functions from (store, root, arguments) to a new root. Nothing here
//! modifies a stored node; every edit re-stores the affected parent chain and
//! shares all other subtrees with the input. An edit that changes nothing
//! yields the input root unchanged, since identical content hashes to the
//! same ContentId.

use crate::error::TreeError;
use crate::filter::CompiledFilter;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use crate::tree::path::TreePath;
use crate::tree::resolver::{NodeDefaults, ParentChain};
use crate::types::{ContentId, Permissions, Timestamp};
use std::collections::HashMap;

/// Place an already-stored file node at `path`.
///
/// Missing parent directories are created; an existing file is replaced. An
/// existing directory at `path` is `NotAFile`.
pub fn with_file_node(
    store: &NodeStore,
    defaults: NodeDefaults,
    root: ContentId,
    path: &TreePath,
    file: ContentId,
) -> Result<ContentId, TreeError> {
    if path.is_root() {
        return Err(TreeError::invalid_path("/", "cannot replace the root with a file"));
    }

    let chain = ParentChain::resolve_or_create(store, root, path, defaults)?;
    if let Some(existing) = chain.target() {
        if let Node::Directory(_) = store.require(&existing)?.as_ref() {
            return Err(TreeError::NotAFile(path.to_string()));
        }
    }
    Ok(chain.commit(store, Some(file)))
}

/// Copy a stored file to `path`, optionally overriding its permissions.
///
/// Without an override the source node is referenced as-is (zero-copy).
pub fn with_file(
    store: &NodeStore,
    defaults: NodeDefaults,
    root: ContentId,
    path: &TreePath,
    source: ContentId,
    permissions: Option<Permissions>,
) -> Result<ContentId, TreeError> {
    let placed = file_with_permissions(store, source, permissions)?;
    with_file_node(store, defaults, root, path, placed)
}

/// Copy several stored files into the directory at `dir`, each under its
/// own name.
pub fn with_files(
    store: &NodeStore,
    defaults: NodeDefaults,
    root: ContentId,
    dir: &TreePath,
    sources: &[(String, ContentId)],
    permissions: Option<Permissions>,
) -> Result<ContentId, TreeError> {
    let mut root = with_new_directory(store, defaults, root, dir, defaults.dir_permissions)?;
    for (name, source) in sources {
        root = with_file(store, defaults, root, &dir.join(name), *source, permissions)?;
    }
    Ok(root)
}

fn file_with_permissions(
    store: &NodeStore,
    source: ContentId,
    permissions: Option<Permissions>,
) -> Result<ContentId, TreeError> {
    let node = store.require(&source)?;
    let file = node
        .as_file()
        .ok_or_else(|| TreeError::NotAFile(source.short()))?;

    match permissions {
        Some(permissions) if permissions != file.permissions => Ok(store.put_file(FileNode {
            contents: file.contents.clone(),
            permissions,
            mtime: file.mtime,
        })),
        _ => Ok(source),
    }
}

/// Merge the filtered contents of `source` into the directory at `path`.
///
/// Entries only in the destination are kept. Entries in both are taken from
/// the source, except that two directories merge recursively (the merged
/// directory carries the source's metadata).
pub fn with_directory(
    store: &NodeStore,
    defaults: NodeDefaults,
    root: ContentId,
    path: &TreePath,
    source: ContentId,
    filter: &CompiledFilter,
    permissions: Option<Permissions>,
) -> Result<ContentId, TreeError> {
    let mut incoming = filter.apply(store, source)?;
    if let Some(permissions) = permissions {
        incoming = override_file_permissions(store, incoming, permissions, &mut HashMap::new())?;
    }

    if path.is_root() {
        return merge_directories(store, root, incoming);
    }

    let chain = ParentChain::resolve_or_create(store, root, path, defaults)?;
    let merged = match chain.target() {
        None => incoming,
        Some(existing) => match store.require(&existing)?.as_ref() {
            Node::Directory(_) => merge_directories(store, existing, incoming)?,
            Node::File(_) => return Err(TreeError::NotADirectory(path.to_string())),
        },
    };
    Ok(chain.commit(store, Some(merged)))
}

fn merge_directories(
    store: &NodeStore,
    dest: ContentId,
    source: ContentId,
) -> Result<ContentId, TreeError> {
    if dest == source {
        return Ok(dest);
    }

    let dest_dir = store.require_directory(&dest)?;
    let source_dir = store.require_directory(&source)?;

    let mut merged = DirectoryNode {
        entries: dest_dir.entries,
        permissions: source_dir.permissions,
        mtime: source_dir.mtime,
    };

    for (name, incoming) in source_dir.entries {
        let entry = match merged.get(&name) {
            Some(existing) if existing != incoming => {
                let both_dirs = matches!(store.require(&existing)?.as_ref(), Node::Directory(_))
                    && matches!(store.require(&incoming)?.as_ref(), Node::Directory(_));
                if both_dirs {
                    merge_directories(store, existing, incoming)?
                } else {
                    incoming
                }
            }
            _ => incoming,
        };
        merged.entries.insert(name, entry);
    }

    Ok(store.put_directory(merged))
}

fn override_file_permissions(
    store: &NodeStore,
    dir_id: ContentId,
    permissions: Permissions,
    seen: &mut HashMap<ContentId, ContentId>,
) -> Result<ContentId, TreeError> {
    if let Some(done) = seen.get(&dir_id) {
        return Ok(*done);
    }

    let mut dir = store.require_directory(&dir_id)?;
    for child in dir.entries.values_mut() {
        *child = match store.require(child)?.as_ref() {
            Node::File(_) => file_with_permissions(store, *child, Some(permissions))?,
            Node::Directory(_) => override_file_permissions(store, *child, permissions, seen)?,
        };
    }

    let id = store.put_directory(dir);
    seen.insert(dir_id, id);
    Ok(id)
}

/// Create an empty directory at `path`.
///
/// An existing directory is left as it is; an existing file is
/// `NotADirectory`.
pub fn with_new_directory(
    store: &NodeStore,
    defaults: NodeDefaults,
    root: ContentId,
    path: &TreePath,
    permissions: Permissions,
) -> Result<ContentId, TreeError> {
    if path.is_root() {
        return Ok(root);
    }

    let chain = ParentChain::resolve_or_create(store, root, path, defaults)?;
    match chain.target() {
        Some(existing) => match store.require(&existing)?.as_ref() {
            Node::Directory(_) => Ok(root),
            Node::File(_) => Err(TreeError::NotADirectory(path.to_string())),
        },
        None => {
            let dir = store.put_directory(DirectoryNode::empty(permissions, defaults.mtime));
            Ok(chain.commit(store, Some(dir)))
        }
    }
}

/// Remove each path if present. Missing paths are ignored; removing the root
/// empties it.
pub fn without(
    store: &NodeStore,
    root: ContentId,
    paths: &[TreePath],
) -> Result<ContentId, TreeError> {
    let mut root = root;
    for path in paths {
        if path.is_root() {
            let dir = store.require_directory(&root)?;
            root = store.put_directory(DirectoryNode::empty(dir.permissions, dir.mtime));
            continue;
        }

        let Some(chain) = ParentChain::resolve_existing(store, root, path)? else {
            continue;
        };
        if chain.target().is_some() {
            root = chain.commit(store, None);
        }
    }
    Ok(root)
}

/// Set the modification time of every node, the root included.
pub fn with_timestamps(
    store: &NodeStore,
    root: ContentId,
    mtime: Timestamp,
) -> Result<ContentId, TreeError> {
    restamp(store, root, mtime, &mut HashMap::new())
}

fn restamp(
    store: &NodeStore,
    id: ContentId,
    mtime: Timestamp,
    seen: &mut HashMap<ContentId, ContentId>,
) -> Result<ContentId, TreeError> {
    if let Some(done) = seen.get(&id) {
        return Ok(*done);
    }

    let restamped = match store.require(&id)?.as_ref() {
        Node::File(file) => store.put_file(FileNode {
            contents: file.contents.clone(),
            permissions: file.permissions,
            mtime,
        }),
        Node::Directory(dir) => {
            let mut dir = dir.clone();
            for child in dir.entries.values_mut() {
                *child = restamp(store, *child, mtime, seen)?;
            }
            dir.mtime = mtime;
            store.put_directory(dir)
        }
    };

    seen.insert(id, restamped);
    Ok(restamped)
}
