//! Tree engine
//!
//! [`Engine`] is the session object: it owns the node store and the
//! operation cache and exposes every tree operation over [`Tree`] and
//! [`FileRef`] handles. Arguments are validated here, at the boundary, so
//! the layers below only see well-formed paths and permission bits.
//!
//! Mutations and diffs are memoized by (operation, input ContentIds,
//! arguments). Inputs that carry content, like the bytes of a new file, are
//! stored first so the cache key only needs the resulting ContentId.

use crate::cache::{CacheKey, CacheStats, OpCache};
use crate::config::EngineConfig;
use crate::diff;
use crate::digest;
use crate::error::{ConfigError, HostError, TreeError};
use crate::host::export::export_tree;
use crate::host::loader::load_host_dir;
use crate::host::{HostFs, LocalFs};
use crate::mutation;
use crate::options::{
    CopyFileOptions, DirectoryCopyOptions, ExportOptions, LoadOptions, NewDirectoryOptions,
    NewFileOptions,
};
use crate::query::{self, EntryInfo};
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use crate::tree::path::TreePath;
use crate::tree::resolver::{resolve, resolve_directory};
use crate::tree::{FileRef, Tree};
use crate::types::{ContentId, Permissions, Timestamp};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// One tree-engine session.
#[derive(Debug)]
pub struct Engine {
    store: Arc<NodeStore>,
    cache: OpCache,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_store(Arc::new(NodeStore::new()), EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with a fresh store.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_store(Arc::new(NodeStore::new()), config))
    }

    fn with_store(store: Arc<NodeStore>, config: EngineConfig) -> Self {
        Self {
            store,
            cache: OpCache::new(config.cache.enabled),
            config,
        }
    }

    pub fn store(&self) -> &Arc<NodeStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn memoize<A: Serialize>(
        &self,
        op: &'static str,
        inputs: &[ContentId],
        args: &A,
        compute: impl FnOnce() -> Result<ContentId, TreeError>,
    ) -> Result<Tree, TreeError> {
        let key = CacheKey::new(op, inputs, args)?;
        self.cache.get_or_compute(op, key, compute).map(Tree::from_root)
    }

    // ---- constructors ----

    /// An empty directory tree with the default directory metadata.
    pub fn scratch(&self) -> Tree {
        let root = self.store.put_directory(DirectoryNode::empty(
            self.config.default_dir_permissions,
            self.config.default_timestamp,
        ));
        Tree::from_root(root)
    }

    /// Store a standalone file. Only the last component of `path` is kept,
    /// as the name the file gets when placed by `with_files`.
    pub fn new_file(
        &self,
        path: &str,
        contents: impl Into<Vec<u8>>,
        options: &NewFileOptions,
    ) -> Result<FileRef, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        let name = path
            .file_name()
            .ok_or_else(|| TreeError::invalid_path("/", "a file needs a name"))?
            .to_string();
        let id = self.put_file(contents.into(), options.permissions);
        Ok(FileRef::new(id, name))
    }

    fn put_file(&self, contents: Vec<u8>, permissions: Permissions) -> ContentId {
        self.store.put_file(FileNode {
            contents,
            permissions,
            mtime: self.config.default_timestamp,
        })
    }

    // ---- mutations ----

    /// Write a new file at `path`, creating missing parent directories.
    #[instrument(skip(self, contents), fields(root = %tree.root().short(), len = contents.len()))]
    pub fn with_new_file(
        &self,
        tree: Tree,
        path: &str,
        contents: &[u8],
        options: &NewFileOptions,
    ) -> Result<Tree, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        let file = self.put_file(contents.to_vec(), options.permissions);
        self.memoize("with_new_file", &[tree.root(), file], &path.to_string(), || {
            let defaults = self.config.node_defaults();
            mutation::with_file_node(&self.store, defaults, tree.root(), &path, file)
        })
    }

    /// Place an existing file at `path`.
    #[instrument(skip(self, file), fields(root = %tree.root().short(), file = %file.id().short()))]
    pub fn with_file(
        &self,
        tree: Tree,
        path: &str,
        file: &FileRef,
        options: &CopyFileOptions,
    ) -> Result<Tree, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        let source = file.id();
        self.memoize(
            "with_file",
            &[tree.root(), source],
            &(path.to_string(), options),
            || {
                mutation::with_file(
                    &self.store,
                    self.config.node_defaults(),
                    tree.root(),
                    &path,
                    source,
                    options.permissions,
                )
            },
        )
    }

    /// Place each file at `path/<name>`.
    #[instrument(skip(self, files), fields(root = %tree.root().short(), count = files.len()))]
    pub fn with_files(
        &self,
        tree: Tree,
        path: &str,
        files: &[FileRef],
        options: &CopyFileOptions,
    ) -> Result<Tree, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        let mut inputs = vec![tree.root()];
        inputs.extend(files.iter().map(FileRef::id));
        let sources: Vec<(String, ContentId)> = files
            .iter()
            .map(|f| (f.name().to_string(), f.id()))
            .collect();
        let names: Vec<&str> = files.iter().map(FileRef::name).collect();

        self.memoize(
            "with_files",
            &inputs,
            &(path.to_string(), names, options),
            || {
                mutation::with_files(
                    &self.store,
                    self.config.node_defaults(),
                    tree.root(),
                    &path,
                    &sources,
                    options.permissions,
                )
            },
        )
    }

    /// Merge the filtered contents of `source` into the directory at `path`.
    #[instrument(
        skip(self, options),
        fields(root = %tree.root().short(), source = %source.root().short())
    )]
    pub fn with_directory(
        &self,
        tree: Tree,
        path: &str,
        source: Tree,
        options: &DirectoryCopyOptions,
    ) -> Result<Tree, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        let filter = options.filter.compile()?;
        self.memoize(
            "with_directory",
            &[tree.root(), source.root()],
            &(path.to_string(), options),
            || {
                mutation::with_directory(
                    &self.store,
                    self.config.node_defaults(),
                    tree.root(),
                    &path,
                    source.root(),
                    &filter,
                    options.permissions,
                )
            },
        )
    }

    /// Ensure an empty directory exists at `path`.
    #[instrument(skip(self), fields(root = %tree.root().short()))]
    pub fn with_new_directory(
        &self,
        tree: Tree,
        path: &str,
        options: &NewDirectoryOptions,
    ) -> Result<Tree, TreeError> {
        options.validate()?;
        let path = TreePath::parse(path)?;
        self.memoize(
            "with_new_directory",
            &[tree.root()],
            &(path.to_string(), options),
            || {
                mutation::with_new_directory(
                    &self.store,
                    self.config.node_defaults(),
                    tree.root(),
                    &path,
                    options.permissions,
                )
            },
        )
    }

    /// Remove files or directories. Paths that do not exist are ignored.
    #[instrument(skip(self, paths), fields(root = %tree.root().short(), count = paths.len()))]
    pub fn without<S: AsRef<str>>(&self, tree: Tree, paths: &[S]) -> Result<Tree, TreeError> {
        let paths = paths
            .iter()
            .map(|p| TreePath::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let normalized: Vec<String> = paths.iter().map(TreePath::to_string).collect();
        self.memoize("without", &[tree.root()], &normalized, || {
            mutation::without(&self.store, tree.root(), &paths)
        })
    }

    /// Alias of [`Engine::without`] for one file.
    pub fn without_file(&self, tree: Tree, path: &str) -> Result<Tree, TreeError> {
        self.without(tree, &[path])
    }

    /// Alias of [`Engine::without`] for one directory.
    pub fn without_directory(&self, tree: Tree, path: &str) -> Result<Tree, TreeError> {
        self.without(tree, &[path])
    }

    /// Set every node's modification time, the root included.
    #[instrument(skip(self), fields(root = %tree.root().short()))]
    pub fn with_timestamps(&self, tree: Tree, mtime: Timestamp) -> Result<Tree, TreeError> {
        self.memoize("with_timestamps", &[tree.root()], &mtime, || {
            mutation::with_timestamps(&self.store, tree.root(), mtime)
        })
    }

    // ---- queries ----

    /// Sorted names of the directory at `path`.
    pub fn entries(&self, tree: Tree, path: &str) -> Result<Vec<String>, TreeError> {
        query::entries(&self.store, tree.root(), &TreePath::parse(path)?)
    }

    /// Relative paths matching `pattern`, depth-first and lexicographic.
    pub fn glob(&self, tree: Tree, pattern: &str) -> Result<Vec<String>, TreeError> {
        query::glob(&self.store, tree.root(), pattern)
    }

    pub fn stat(&self, tree: Tree, path: &str) -> Result<EntryInfo, TreeError> {
        query::stat(&self.store, tree.root(), &TreePath::parse(path)?)
    }

    /// The file at `path`.
    pub fn file(&self, tree: Tree, path: &str) -> Result<FileRef, TreeError> {
        let path = TreePath::parse(path)?;
        let (id, node) = resolve(&self.store, tree.root(), &path)?;
        match (node.as_ref(), path.file_name()) {
            (Node::File(_), Some(name)) => Ok(FileRef::new(id, name.to_string())),
            _ => Err(TreeError::NotAFile(path.to_string())),
        }
    }

    /// The directory at `path` as a tree of its own.
    pub fn directory(&self, tree: Tree, path: &str) -> Result<Tree, TreeError> {
        let (id, _) = resolve_directory(&self.store, tree.root(), &TreePath::parse(path)?)?;
        Ok(Tree::from_root(id))
    }

    pub fn file_contents(&self, file: &FileRef) -> Result<Vec<u8>, TreeError> {
        let node = self.store.require(&file.id())?;
        node.as_file()
            .map(|f| f.contents.clone())
            .ok_or_else(|| TreeError::NotAFile(file.id().short()))
    }

    // ---- diff and digest ----

    /// Everything `other` adds or changes relative to `base`.
    #[instrument(skip(self), fields(base = %base.root().short(), other = %other.root().short()))]
    pub fn diff(&self, base: Tree, other: Tree) -> Result<Tree, TreeError> {
        self.memoize("diff", &[base.root(), other.root()], &(), || {
            diff::diff(&self.store, base.root(), other.root())
        })
    }

    pub fn digest(&self, tree: Tree) -> String {
        digest::render(tree.root())
    }

    /// Re-hash every node of `tree`; returns the number of distinct nodes.
    pub fn verify(&self, tree: Tree) -> Result<usize, TreeError> {
        digest::verify(&self.store, tree.root())
    }

    /// Check that every node of the tree is present in the store and intact.
    pub fn sync(&self, tree: Tree) -> Result<Tree, TreeError> {
        self.store.require_directory(&tree.root())?;
        digest::verify(&self.store, tree.root())?;
        debug!(root = %tree.root().short(), "Tree synced");
        Ok(tree)
    }

    // ---- host ----

    /// Write `tree` into the host directory `dest`.
    pub fn export(
        &self,
        tree: Tree,
        dest: &Path,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, HostError> {
        self.export_with(&LocalFs, tree, dest, options, cancel)
    }

    pub fn export_with(
        &self,
        fs: &dyn HostFs,
        tree: Tree,
        dest: &Path,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, HostError> {
        export_tree(&self.store, fs, tree, dest, options, cancel)
    }

    /// Import the local directory `path` as a tree.
    pub fn load(&self, path: &Path, options: &LoadOptions) -> Result<Tree, HostError> {
        load_host_dir(&self.store, path, options)
    }
}
