//! Operation cache
//!
//! Memoizes tree-producing operations by (operation, input ContentIds,
//! arguments). Concurrent requests for the same key share one computation:
//! the first caller runs it and the others block until its result is ready.
//!
//! `MissingNode` depends on what the store holds at call time, not on the
//! inputs, so it is handed to the callers waiting on it but never kept.

use crate::error::TreeError;
use crate::tree::hasher;
use crate::types::{ContentId, Hash};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

type Slot = Arc<OnceLock<Result<ContentId, TreeError>>>;

/// Identity of one memoized operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(Hash);

impl CacheKey {
    pub fn new<A: Serialize>(op: &str, inputs: &[ContentId], args: &A) -> Result<Self, TreeError> {
        let args = serde_json::to_vec(args)
            .map_err(|e| TreeError::InvalidArgument(format!("unserializable arguments: {}", e)))?;

        let mut buf = Vec::with_capacity(op.len() + inputs.len() * 32 + args.len() + 16);
        buf.extend_from_slice(&(op.len() as u64).to_be_bytes());
        buf.extend_from_slice(op.as_bytes());
        buf.extend_from_slice(&(inputs.len() as u64).to_be_bytes());
        for input in inputs {
            buf.extend_from_slice(input.as_bytes());
        }
        buf.extend_from_slice(&args);

        Ok(Self(hasher::compute_hash(&buf)))
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered by an existing or in-flight computation
    pub hits: u64,
    /// Computations actually run
    pub computations: u64,
    /// Distinct keys held
    pub entries: usize,
}

#[derive(Debug)]
pub struct OpCache {
    enabled: bool,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    hits: AtomicU64,
    computations: AtomicU64,
}

impl OpCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    /// Return the memoized result for `key`, running `compute` at most once
    /// per key across all threads.
    pub fn get_or_compute<F>(
        &self,
        op: &str,
        key: CacheKey,
        compute: F,
    ) -> Result<ContentId, TreeError>
    where
        F: FnOnce() -> Result<ContentId, TreeError>,
    {
        if !self.enabled {
            self.computations.fetch_add(1, Ordering::Relaxed);
            return compute();
        }

        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key).or_default())
        };

        let mut ran = false;
        let result = slot
            .get_or_init(|| {
                ran = true;
                self.computations.fetch_add(1, Ordering::Relaxed);
                compute()
            })
            .clone();

        if !ran {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(op, "Operation served from cache");
        }
        if matches!(result, Err(TreeError::MissingNode(_))) {
            self.evict(key, &slot);
        }
        result
    }

    /// Drop `key` if it still maps to `slot`.
    fn evict(&self, key: CacheKey, slot: &Slot) {
        let mut slots = self.slots.lock();
        if slots.get(&key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(&key);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            entries: self.slots.lock().len(),
        }
    }
}
