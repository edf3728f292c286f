//! Import of host directories into the node store
//!
//! The host directory is walked pre-order in name order. Each directory
//! being visited holds an open frame; a frame is stored as a directory node
//! once the walk leaves it. Excluded directories are pruned during the walk;
//! includes are applied to the stored result. Symlinks, special files and
//! entries whose names are not valid tree names are skipped.
//!
//! Loading always reads the local disk: the walk is driven by `walkdir`.

use crate::error::HostError;
use crate::host::{HostFs, HostKind, LocalFs};
use crate::options::LoadOptions;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, FileNode};
use crate::tree::path::validate_name;
use crate::tree::Tree;
use crate::types::ContentId;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// A directory whose entries are still being collected.
struct Frame {
    name: String,
    node: DirectoryNode,
}

/// Load the host directory `root` as a tree.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn load_host_dir(
    store: &NodeStore,
    root: &Path,
    options: &LoadOptions,
) -> Result<Tree, HostError> {
    let start = Instant::now();
    let fs = LocalFs;
    match fs.stat(root).map_err(|e| HostError::io(root, e))? {
        Some(stat) if stat.kind == HostKind::Directory => {}
        _ => return Err(HostError::InvalidSource(root.to_path_buf())),
    }

    let filter = options.filter.compile()?;
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !filter.excluded(&relative_path(root, entry.path()))
        });

    let mut stack: Vec<Frame> = Vec::new();
    let mut root_id = None;
    let mut files = 0usize;
    let mut skipped = 0usize;

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => HostError::io(path, io),
                None => HostError::InvalidSource(path),
            }
        })?;
        let depth = entry.depth();
        let path = entry.path();

        while stack.len() > depth {
            close_frame(store, &mut stack, &mut root_id);
        }

        let Some(stat) = fs.stat(path).map_err(|e| HostError::io(path, e))? else {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        };

        let name = if depth == 0 {
            String::new()
        } else {
            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| "not valid UTF-8".to_string())
                .and_then(|name| validate_name(name).map_err(|e| e.to_string()));
            match name {
                Ok(name) => name,
                Err(reason) => {
                    warn!(
                        path = %path.display(),
                        reason = %reason,
                        "Skipping entry with unusable name"
                    );
                    skipped += 1;
                    if stat.kind == HostKind::Directory {
                        walker.skip_current_dir();
                    }
                    continue;
                }
            }
        };

        match stat.kind {
            HostKind::Directory => stack.push(Frame {
                name,
                node: DirectoryNode::empty(stat.permissions, stat.mtime),
            }),
            HostKind::File => {
                let contents = fs.read(path).map_err(|e| HostError::io(path, e))?;
                let id = store.put_file(FileNode {
                    contents,
                    permissions: stat.permissions,
                    mtime: stat.mtime,
                });
                if let Some(parent) = stack.last_mut() {
                    parent.node.entries.insert(name, id);
                }
                files += 1;
            }
            HostKind::Other => {
                debug!(path = %path.display(), "Skipping symlink or special file");
                skipped += 1;
            }
        }
    }

    while !stack.is_empty() {
        close_frame(store, &mut stack, &mut root_id);
    }

    let root_id = root_id.ok_or_else(|| HostError::InvalidSource(root.to_path_buf()))?;
    let root_id = filter.apply(store, root_id)?;

    info!(
        files,
        skipped,
        duration_ms = start.elapsed().as_millis(),
        "Host directory loaded"
    );
    Ok(Tree::from_root(root_id))
}

/// Store the innermost open directory and link it into its parent.
fn close_frame(store: &NodeStore, stack: &mut Vec<Frame>, root_id: &mut Option<ContentId>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let id = store.put_directory(frame.node);
    match stack.last_mut() {
        Some(parent) => {
            parent.node.entries.insert(frame.name, id);
        }
        None => *root_id = Some(id),
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
