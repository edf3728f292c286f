//! Per-operation options.
//!
//! Every optional argument has an explicit field with a literal default and
//! is validated before reaching the tree engine.

use crate::error::TreeError;
use crate::filter::CopyFilter;
use crate::types::{Permissions, MAX_PERMISSIONS};
use serde::{Deserialize, Serialize};

fn check_permissions(permissions: Permissions) -> Result<(), TreeError> {
    if permissions > MAX_PERMISSIONS {
        return Err(TreeError::InvalidArgument(format!(
            "permissions {:#o} exceed {:#o}",
            permissions, MAX_PERMISSIONS
        )));
    }
    Ok(())
}

/// Options for `new_file` and `with_new_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileOptions {
    /// Default: `0o644`
    pub permissions: Permissions,
}

impl Default for NewFileOptions {
    fn default() -> Self {
        Self { permissions: 0o644 }
    }
}

impl NewFileOptions {
    pub fn permissions(permissions: Permissions) -> Self {
        Self { permissions }
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        check_permissions(self.permissions)
    }
}

/// Options for `with_file` and `with_files`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFileOptions {
    /// Default: `None` (keep the source file's permissions)
    pub permissions: Option<Permissions>,
}

impl CopyFileOptions {
    pub fn validate(&self) -> Result<(), TreeError> {
        self.permissions.map_or(Ok(()), check_permissions)
    }
}

/// Options for `with_directory`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCopyOptions {
    /// Default: empty (copy everything)
    #[serde(default)]
    pub filter: CopyFilter,
    /// Default: `None`. When set, applied to every copied file.
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

impl DirectoryCopyOptions {
    pub fn filter(filter: CopyFilter) -> Self {
        Self {
            filter,
            permissions: None,
        }
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        self.permissions.map_or(Ok(()), check_permissions)
    }
}

/// Options for `with_new_directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectoryOptions {
    /// Default: `0o755`
    pub permissions: Permissions,
}

impl Default for NewDirectoryOptions {
    fn default() -> Self {
        Self { permissions: 0o755 }
    }
}

impl NewDirectoryOptions {
    pub fn permissions(permissions: Permissions) -> Self {
        Self { permissions }
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        check_permissions(self.permissions)
    }
}

/// Options for `export`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Default: `false` (merge into existing host content). When `true`,
    /// host entries absent from the tree are deleted first.
    pub wipe: bool,
}

impl ExportOptions {
    pub fn wipe() -> Self {
        Self { wipe: true }
    }

    pub fn merge() -> Self {
        Self { wipe: false }
    }
}

/// Options for loading a host directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Default: empty (load everything)
    #[serde(default)]
    pub filter: CopyFilter,
}
