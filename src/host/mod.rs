//! Host filesystem boundary
//!
//! The exporter writes to the host only through [`HostFs`], so a tree can be
//! materialized onto any backend. The loader always walks the local disk and
//! reads through [`LocalFs`], the `std::fs` implementation.

pub mod export;
pub mod loader;

use crate::types::{Permissions, Timestamp, MAX_PERMISSIONS};
use filetime::FileTime;
use std::fs;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a host entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    File,
    Directory,
    /// Symlinks, sockets, devices; never followed or imported
    Other,
}

/// Metadata of a host entry (symlinks are not followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostStat {
    pub kind: HostKind,
    pub permissions: Permissions,
    pub mtime: Timestamp,
    pub len: u64,
}

/// Primitive host filesystem operations, addressed by caller-resolved paths.
pub trait HostFs: Send + Sync {
    /// `None` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> io::Result<Option<HostStat>>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Create or truncate a file.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    /// Create a directory and any missing parents.
    fn create_dir(&self, path: &Path) -> io::Result<()>;
    /// Remove a file, or a directory with everything in it.
    fn remove(&self, path: &Path) -> io::Result<()>;
    /// Raw names of the entries of a directory, sorted.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;
    /// Absolute path of an existing entry with symlinks resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
    fn set_permissions(&self, path: &Path, permissions: Permissions) -> io::Result<()>;
    fn set_mtime(&self, path: &Path, mtime: Timestamp) -> io::Result<()>;
}

/// [`HostFs`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl HostFs for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<Option<HostStat>> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            HostKind::File
        } else if file_type.is_dir() {
            HostKind::Directory
        } else {
            HostKind::Other
        };

        Ok(Some(HostStat {
            kind,
            permissions: permissions_of(&metadata, kind),
            mtime: FileTime::from_last_modification_time(&metadata).unix_seconds(),
            len: metadata.len(),
        }))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            names.push(entry?.file_name());
        }
        names.sort();
        Ok(names)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> io::Result<()> {
        fs::set_permissions(path, to_std_permissions(path, permissions)?)
    }

    fn set_mtime(&self, path: &Path, mtime: Timestamp) -> io::Result<()> {
        filetime::set_file_mtime(path, FileTime::from_unix_time(mtime, 0))
    }
}

#[cfg(unix)]
fn permissions_of(metadata: &fs::Metadata, _kind: HostKind) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & MAX_PERMISSIONS
}

#[cfg(not(unix))]
fn permissions_of(metadata: &fs::Metadata, kind: HostKind) -> Permissions {
    let base = match kind {
        HostKind::Directory => 0o755,
        _ => 0o644,
    };
    if metadata.permissions().readonly() {
        base & 0o555 & MAX_PERMISSIONS
    } else {
        base
    }
}

#[cfg(unix)]
fn to_std_permissions(_path: &Path, permissions: Permissions) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(permissions & MAX_PERMISSIONS))
}

#[cfg(not(unix))]
fn to_std_permissions(path: &Path, permissions: Permissions) -> io::Result<fs::Permissions> {
    let mut std_permissions = fs::metadata(path)?.permissions();
    std_permissions.set_readonly(permissions & 0o200 == 0);
    Ok(std_permissions)
}
