//! Core identity and metadata types shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission bits of a node (the low twelve mode bits, e.g. `0o644`).
pub type Permissions = u32;

/// Modification time in whole seconds since the Unix epoch.
pub type Timestamp = i64;

/// Largest value accepted as [`Permissions`].
pub const MAX_PERMISSIONS: Permissions = 0o7777;

/// Raw BLAKE3 output.
pub type Hash = [u8; 32];

/// Content identifier of a node.
///
/// Computed over the node's full structural content and nothing else, so two
/// nodes with equal `ContentId` are interchangeable and share storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(Hash);

impl ContentId {
    pub const fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
