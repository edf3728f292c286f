//! Export of stored trees onto the host filesystem
//!
//! Merge mode keeps host entries the tree does not name; wipe mode removes
//! them so the host directory becomes an exact mirror. In both modes an
//! entry whose kind differs from the tree's is replaced. Directory metadata
//! is applied after the directory's children have been written.
//!
//! There is no rollback: a failure or cancellation leaves whatever was
//! written so far in place.

use crate::error::HostError;
use crate::host::{HostFs, HostKind};
use crate::options::ExportOptions;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use crate::tree::Tree;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Counters for one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub files: usize,
    pub directories: usize,
    pub removed: usize,
}

struct Exporter<'a> {
    store: &'a NodeStore,
    fs: &'a dyn HostFs,
    wipe: bool,
    cancel: &'a CancellationToken,
    stats: ExportStats,
}

/// Write `tree` into the host directory `dest`, creating it if missing.
///
/// `dest` may be a symlink to a directory; the export goes to its target.
/// Returns the canonical path of `dest`.
#[instrument(skip_all, fields(dest = %dest.display(), wipe = options.wipe))]
pub fn export_tree(
    store: &NodeStore,
    fs: &dyn HostFs,
    tree: Tree,
    dest: &Path,
    options: &ExportOptions,
    cancel: &CancellationToken,
) -> Result<PathBuf, HostError> {
    let start = Instant::now();
    let root = store.require_directory(&tree.root())?;

    if fs.stat(dest).map_err(|e| HostError::io(dest, e))?.is_none() {
        fs.create_dir(dest).map_err(|e| HostError::io(dest, e))?;
    }
    let canonical = fs.canonicalize(dest).map_err(|e| HostError::io(dest, e))?;
    match fs.stat(&canonical).map_err(|e| HostError::io(&canonical, e))? {
        Some(stat) if stat.kind == HostKind::Directory => {}
        _ => return Err(HostError::InvalidDestination(dest.to_path_buf())),
    }

    let mut exporter = Exporter {
        store,
        fs,
        wipe: options.wipe,
        cancel,
        stats: ExportStats::default(),
    };
    exporter.write_directory(&root, &canonical)?;

    info!(
        files = exporter.stats.files,
        directories = exporter.stats.directories,
        removed = exporter.stats.removed,
        duration_ms = start.elapsed().as_millis(),
        "Export completed"
    );
    Ok(canonical)
}

impl Exporter<'_> {
    fn check_cancelled(&self) -> Result<(), HostError> {
        if self.cancel.is_cancelled() {
            return Err(HostError::Cancelled);
        }
        Ok(())
    }

    /// Write the entries of `dir` into the existing host directory `path`.
    fn write_directory(&mut self, dir: &DirectoryNode, path: &Path) -> Result<(), HostError> {
        if self.wipe {
            let existing = self.fs.read_dir(path).map_err(|e| HostError::io(path, e))?;
            for name in existing {
                // Names that are not UTF-8 can never match a tree entry
                if name.to_str().is_some_and(|n| dir.entries.contains_key(n)) {
                    continue;
                }
                self.check_cancelled()?;
                let stale = path.join(&name);
                debug!(path = %stale.display(), "Removing entry absent from tree");
                self.fs.remove(&stale).map_err(|e| HostError::io(&stale, e))?;
                self.stats.removed += 1;
            }
        }

        for (name, id) in dir.entries.iter() {
            self.check_cancelled()?;
            let child = path.join(name);
            match self.store.require(id)?.as_ref() {
                Node::File(file) => self.write_file(file, &child)?,
                Node::Directory(sub) => {
                    self.prepare_directory(&child)?;
                    self.write_directory(sub, &child)?;
                }
            }
        }

        self.fs
            .set_permissions(path, dir.permissions)
            .map_err(|e| HostError::io(path, e))?;
        self.fs
            .set_mtime(path, dir.mtime)
            .map_err(|e| HostError::io(path, e))?;
        self.stats.directories += 1;
        Ok(())
    }

    fn prepare_directory(&mut self, path: &Path) -> Result<(), HostError> {
        match self.fs.stat(path).map_err(|e| HostError::io(path, e))? {
            Some(stat) if stat.kind == HostKind::Directory => Ok(()),
            Some(_) => {
                self.fs.remove(path).map_err(|e| HostError::io(path, e))?;
                self.stats.removed += 1;
                self.fs.create_dir(path).map_err(|e| HostError::io(path, e))
            }
            None => self.fs.create_dir(path).map_err(|e| HostError::io(path, e)),
        }
    }

    fn write_file(&mut self, file: &FileNode, path: &Path) -> Result<(), HostError> {
        // Read-only files and directories in the way are removed, not truncated
        if let Some(stat) = self.fs.stat(path).map_err(|e| HostError::io(path, e))? {
            self.fs.remove(path).map_err(|e| HostError::io(path, e))?;
            if stat.kind != HostKind::File {
                self.stats.removed += 1;
            }
        }

        self.fs
            .write(path, &file.contents)
            .map_err(|e| HostError::io(path, e))?;
        self.fs
            .set_permissions(path, file.permissions)
            .map_err(|e| HostError::io(path, e))?;
        self.fs
            .set_mtime(path, file.mtime)
            .map_err(|e| HostError::io(path, e))?;
        self.stats.files += 1;
        Ok(())
    }
}
