//! Content identifiers for tree nodes using BLAKE3

use crate::tree::node::{DirectoryNode, FileNode};
use crate::types::{ContentId, Hash, Permissions, Timestamp};
use blake3::Hasher;

/// Compute the ContentId of a file node
///
/// ContentId = hash("file" || permissions || mtime || contents_len || contents)
///
/// The file's location never participates, so identical files anywhere share
/// one identifier.
pub fn compute_file_id(file: &FileNode) -> ContentId {
    let mut hasher = Hasher::new();

    // Hash type discriminator
    hasher.update(b"file");
    hash_metadata(&mut hasher, file.permissions, file.mtime);

    // Contents length (8 bytes, big-endian) keeps the encoding prefix-free
    hasher.update(&(file.contents.len() as u64).to_be_bytes());
    hasher.update(&file.contents);

    ContentId::from_bytes(*hasher.finalize().as_bytes())
}

/// Compute the ContentId of a directory node
///
/// ContentId = hash("directory" || permissions || mtime || count || (name_len || name || child)*)
///
/// Entries come from a BTreeMap, so they are already sorted by name.
pub fn compute_directory_id(dir: &DirectoryNode) -> ContentId {
    let mut hasher = Hasher::new();

    hasher.update(b"directory");
    hash_metadata(&mut hasher, dir.permissions, dir.mtime);

    hasher.update(&(dir.entries.len() as u64).to_be_bytes());
    for (name, child) in dir.entries.iter() {
        hasher.update(&(name.len() as u64).to_be_bytes());
        hasher.update(name.as_bytes());
        hasher.update(child.as_bytes());
    }

    ContentId::from_bytes(*hasher.finalize().as_bytes())
}

fn hash_metadata(hasher: &mut Hasher, permissions: Permissions, mtime: Timestamp) {
    hasher.update(&permissions.to_be_bytes());
    hasher.update(&mtime.to_be_bytes());
}

/// Compute a generic hash of arbitrary data
pub fn compute_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}
