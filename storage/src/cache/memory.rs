//! Process-local shard store.
//!
//! Backed by foyer's in-memory cache. The capacity is far above
//! [`SHARD_COUNT`](super::SHARD_COUNT) so shards are never evicted even when
//! foyer splits its capacity across internal partitions.

use std::sync::Arc;

use foyer::{Cache, CacheBuilder};

use super::{ShardKey, ShardMap, ShardStore};

/// Default entry capacity for the in-memory store.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-memory [`ShardStore`]. Clones share the same underlying cache, so one
/// store can back several adapters.
#[derive(Clone)]
pub struct MemoryShardStore {
    inner: Arc<Cache<ShardKey, ShardMap>>,
}

impl MemoryShardStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let cache = CacheBuilder::new(capacity).build();
        Self {
            inner: Arc::new(cache),
        }
    }
}

impl Default for MemoryShardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardStore for MemoryShardStore {
    fn get(&self, key: ShardKey) -> Option<ShardMap> {
        self.inner.get(&key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: ShardKey, shard: ShardMap) {
        self.inner.insert(key, shard);
    }
}

impl std::fmt::Debug for MemoryShardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryShardStore")
            .field("usage", &self.inner.usage())
            .finish()
    }
}
