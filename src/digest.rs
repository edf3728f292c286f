//! Digest Engine
//!
//! Renders a tree's root ContentId as an externally visible digest. The
//! format is stable for the lifetime of one engine, not across versions.

use crate::error::TreeError;
use crate::store::NodeStore;
use crate::tree::node::Node;
use crate::types::ContentId;
use std::collections::HashSet;

const DIGEST_PREFIX: &str = "blake3:";

pub fn render(root: ContentId) -> String {
    format!("{}{}", DIGEST_PREFIX, root.to_hex())
}

/// Re-hash every node reachable from `root` and check it against its key.
///
/// Returns the number of distinct nodes verified.
pub fn verify(store: &NodeStore, root: ContentId) -> Result<usize, TreeError> {
    let mut seen = HashSet::new();
    let mut pending = vec![root];

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        let node = store.require(&id)?;
        let actual = node.content_id();
        if actual != id {
            return Err(TreeError::HashMismatch {
                expected: id,
                actual,
            });
        }
        if let Node::Directory(dir) = node.as_ref() {
            pending.extend(dir.entries.values().copied());
        }
    }

    Ok(seen.len())
}
