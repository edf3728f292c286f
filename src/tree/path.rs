//! Tree path normalization

use crate::error::TreeError;
use unicode_normalization::UnicodeNormalization;

/// A normalized path inside a tree: zero or more validated entry names.
///
/// The empty path is the tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath {
    components: Vec<String>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and normalize a slash-separated path
    ///
    /// This function:
    /// 1. Normalizes Unicode to NFC
    /// 2. Treats a leading `/` as the tree root
    /// 3. Drops empty and `.` segments
    /// 4. Resolves `..` lexically, rejecting any escape above the root
    pub fn parse(raw: &str) -> Result<Self, TreeError> {
        if raw.contains('\0') {
            return Err(TreeError::invalid_path(raw, "contains NUL byte"));
        }

        let normalized: String = raw.nfc().collect();
        let mut components: Vec<String> = Vec::new();

        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    if components.pop().is_none() {
                        return Err(TreeError::invalid_path(raw, "escapes the tree root"));
                    }
                }
                name => components.push(name.to_string()),
            }
        }

        Ok(Self { components })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Last component, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    pub fn join(&self, name: &str) -> TreePath {
        let mut components = self.components.clone();
        components.push(name.to_string());
        TreePath { components }
    }

    /// Slash-joined form without a leading separator; empty for the root.
    pub fn to_relative_string(&self) -> String {
        self.components.join("/")
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}

/// Validate a single entry name, e.g. a file basename used by `with_files`.
pub fn validate_name(name: &str) -> Result<String, TreeError> {
    let normalized: String = name.nfc().collect();
    if normalized.is_empty() || normalized == "." || normalized == ".." {
        return Err(TreeError::invalid_path(name, "not a valid entry name"));
    }
    if normalized.contains('/') || normalized.contains('\0') {
        return Err(TreeError::invalid_path(name, "entry name contains a separator"));
    }
    Ok(normalized)
}
