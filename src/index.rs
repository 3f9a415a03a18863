//! Memory Index
//!
//! In-memory mapping from each key to the byte offset of its most recent
//! frame in the segment file.
//!
//! ## Responsibilities
//! - Exact-replacement `key -> offset` lookups (latest write wins)
//! - Bulk load from a startup scan, in file order
//! - Ordered iteration for compaction
//!
//! The index is owned exclusively by the storage engine; nothing else may
//! call its mutating operations. That keeps a single-writer discipline while
//! the internal `RwLock` lets any number of readers proceed concurrently.

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Mapping from key to the offset of its latest frame
pub struct MemoryIndex {
    /// Key -> offset of the most recent frame for that key.
    /// BTreeMap so `entries()` iterates in a deterministic (key) order.
    entries: RwLock<BTreeMap<String, u64>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get the segment file offset for a key, or `None` if it was never set
    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.read().get(key).copied()
    }

    /// Store the offset for a key, unconditionally overwriting any earlier one
    pub fn set(&self, key: String, offset: u64) {
        self.entries.write().insert(key, offset);
    }

    /// Bulk-load `(key, offset)` pairs in order, overwriting as it goes.
    ///
    /// Used for the startup scan: pairs arrive in file order, so a later
    /// pair for the same key supersedes the earlier one.
    pub fn set_all(&self, pairs: impl IntoIterator<Item = (String, u64)>) {
        let mut entries = self.entries.write();
        for (key, offset) in pairs {
            entries.insert(key, offset);
        }
    }

    /// Drop every entry (full reset, used during index rebuild)
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of keys in the index
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all `(key, offset)` pairs in key order.
    ///
    /// Each key appears once with its latest offset, which is exactly what
    /// compaction needs to rewrite the live set.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}
