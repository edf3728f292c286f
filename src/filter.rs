//! Copy filters
//!
//! Include/exclude glob lists deciding which entries of a source tree take
//! part in a copy. Patterns are matched against the path relative to the
//! copy root, without a leading separator:
//!
//! - `*` matches any run of characters except `/`, `?` exactly one
//! - `**` matches across any number of directories
//! - a pattern ending in `/` (or `/**`) names a directory and everything in it
//!
//! Exclusion always wins over inclusion. Filtering runs top-down, so an
//! excluded directory's subtree is never visited.

use crate::error::TreeError;
use crate::store::NodeStore;
use crate::tree::node::{DirectoryNode, Node};
use crate::tree::path::TreePath;
use crate::types::ContentId;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Include and exclude pattern lists. An empty include list includes
/// everything not excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CopyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn compile(&self) -> Result<CompiledFilter, TreeError> {
        Ok(CompiledFilter {
            include: PatternSet::new(&self.include)?,
            exclude: PatternSet::new(&self.exclude)?,
        })
    }

    /// Whether a single relative path passes this filter.
    pub fn included(&self, path: &str) -> Result<bool, TreeError> {
        let relative = TreePath::parse(path)?.to_relative_string();
        Ok(self.compile()?.included(&relative))
    }
}

/// A compiled list of glob patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: GlobSet,
    len: usize,
    /// Deepest path (in components) any pattern can match; `None` when a
    /// pattern contains `**` and can match at any depth.
    max_components: Option<usize>,
}

impl PatternSet {
    pub fn new(patterns: &[String]) -> Result<Self, TreeError> {
        let mut builder = GlobSetBuilder::new();
        let mut max_components = Some(0);

        for raw in patterns {
            for glob in expand_pattern(raw)? {
                let compiled = GlobBuilder::new(&glob)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| TreeError::PatternSyntax {
                        pattern: raw.clone(),
                        message: e.kind().to_string(),
                    })?;
                builder.add(compiled);

                max_components = match max_components {
                    _ if glob.contains("**") => None,
                    Some(depth) => Some(depth.max(glob.split('/').count())),
                    None => None,
                };
            }
        }

        let set = builder.build().map_err(|e| TreeError::PatternSyntax {
            pattern: patterns.join(","),
            message: e.to_string(),
        })?;

        Ok(Self {
            set,
            len: patterns.len(),
            max_components,
        })
    }

    /// Compile a single pattern, as used by `glob` queries.
    pub fn single(pattern: &str) -> Result<Self, TreeError> {
        Self::new(&[pattern.to_string()])
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_match(&self, relative: &str) -> bool {
        self.set.is_match(relative)
    }

    /// Whether some pattern could match a path below a directory at `depth`
    /// components.
    pub fn may_match_below(&self, depth: usize) -> bool {
        self.max_components.map_or(true, |max| max > depth)
    }
}

/// Normalize one user pattern into the globs it stands for.
fn expand_pattern(raw: &str) -> Result<Vec<String>, TreeError> {
    let trimmed = raw.trim_start_matches("./").trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(TreeError::PatternSyntax {
            pattern: raw.to_string(),
            message: "empty pattern".to_string(),
        });
    }

    if let Some(dir) = trimmed.strip_suffix('/') {
        let dir = dir.trim_end_matches('/');
        return Ok(vec![dir.to_string(), format!("{dir}/**")]);
    }
    if let Some(dir) = trimmed.strip_suffix("/**") {
        if !dir.is_empty() {
            return Ok(vec![dir.to_string(), trimmed.to_string()]);
        }
    }
    Ok(vec![trimmed.to_string()])
}

/// What to do with a directory met during filtered traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirDecision {
    /// Excluded, or nothing inside can be included.
    Skip,
    /// Included as a whole; only excludes are checked below it.
    Take,
    /// Not included itself; keep it only if something inside is.
    Descend,
}

/// A [`CopyFilter`] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl CompiledFilter {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// (include empty OR any include matches) AND no exclude matches.
    pub fn included(&self, relative: &str) -> bool {
        (self.include.is_empty() || self.include.is_match(relative))
            && !self.exclude.is_match(relative)
    }

    /// Whether any exclude pattern matches. An excluded directory takes its
    /// whole subtree with it.
    pub fn excluded(&self, relative: &str) -> bool {
        self.exclude.is_match(relative)
    }

    fn decide_dir(&self, relative: &str, depth: usize, taken: bool) -> DirDecision {
        if self.exclude.is_match(relative) {
            DirDecision::Skip
        } else if taken || self.include.is_empty() || self.include.is_match(relative) {
            DirDecision::Take
        } else if self.include.may_match_below(depth) {
            DirDecision::Descend
        } else {
            DirDecision::Skip
        }
    }

    /// Build the filtered copy of the tree rooted at `root`.
    ///
    /// The copy root is always kept, even when nothing inside it passes.
    pub fn apply(&self, store: &NodeStore, root: ContentId) -> Result<ContentId, TreeError> {
        if self.is_empty() {
            return Ok(root);
        }
        let dir = store.require_directory(&root)?;
        let taken = self.include.is_empty();
        let filtered = self.filter_dir(store, root, &dir, &TreePath::root(), taken)?;
        Ok(filtered.unwrap_or_else(|| {
            store.put_directory(DirectoryNode::empty(dir.permissions, dir.mtime))
        }))
    }

    fn filter_dir(
        &self,
        store: &NodeStore,
        id: ContentId,
        dir: &DirectoryNode,
        prefix: &TreePath,
        taken: bool,
    ) -> Result<Option<ContentId>, TreeError> {
        // A wholly included directory with no excludes is shared as-is
        if taken && self.exclude.is_empty() {
            return Ok(Some(id));
        }

        let depth = prefix.components().len();
        let mut kept = DirectoryNode::empty(dir.permissions, dir.mtime);

        for (name, child) in dir.entries.iter() {
            let path = prefix.join(name);
            let relative = path.to_relative_string();

            match store.require(child)?.as_ref() {
                Node::File(_) => {
                    let passes = !self.exclude.is_match(&relative)
                        && (taken || self.include.is_empty() || self.include.is_match(&relative));
                    if passes {
                        kept.entries.insert(name.clone(), *child);
                    }
                }
                Node::Directory(child_dir) => match self.decide_dir(&relative, depth + 1, taken) {
                    DirDecision::Skip => {
                        trace!(path = %relative, "Pruned directory from copy");
                    }
                    DirDecision::Take => {
                        if let Some(id) = self.filter_dir(store, *child, child_dir, &path, true)? {
                            kept.entries.insert(name.clone(), id);
                        }
                    }
                    DirDecision::Descend => {
                        if let Some(id) = self.filter_dir(store, *child, child_dir, &path, false)? {
                            kept.entries.insert(name.clone(), id);
                        }
                    }
                },
            }
        }

        if !taken && kept.is_empty() {
            return Ok(None);
        }
        Ok(Some(store.put_directory(kept)))
    }
}
