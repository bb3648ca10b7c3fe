//! In-memory cache of the last good payload per block.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use block_contract::BlockId;
use serde_json::Value;

/// Last good payload of every block fetched so far.
#[derive(Debug, Default)]
pub struct BlockCache {
    entries: Mutex<BTreeMap<BlockId, Value>>,
}

impl BlockCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<BlockId, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached payload for `id`.
    pub fn get(&self, id: &BlockId) -> Option<Value> {
        self.entries().get(id).cloned()
    }

    /// Stores `data` as the latest payload for `id`.
    pub fn insert(&self, id: BlockId, data: Value) {
        self.entries().insert(id, data);
    }

    /// Ids with a cached payload, sorted.
    pub fn ids(&self) -> Vec<BlockId> {
        self.entries().keys().cloned().collect()
    }

    /// Every cached entry, sorted by id.
    pub fn snapshot(&self) -> Vec<(BlockId, Value)> {
        self.entries()
            .iter()
            .map(|(id, data)| (id.clone(), data.clone()))
            .collect()
    }
}
