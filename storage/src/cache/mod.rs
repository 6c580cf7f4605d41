//! Existence cache for object paths.
//!
//! Only positive existence is cached. Paths are grouped into [`SHARD_COUNT`]
//! shards keyed by the first hex digit of the SHA-256 digest of the path, and
//! every mutation rewrites the whole shard in the backing [`ShardStore`]. The
//! shard width bounds the size of any single stored value.
//!
//! Nothing is shared with other clients of the same storage zone: objects
//! written or deleted elsewhere are not reflected here.

mod file;
mod memory;

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};
use tracing::debug;

pub use file::FileShardStore;
pub use memory::MemoryShardStore;

/// Number of shards; one per hex digit.
pub const SHARD_COUNT: usize = 16;

/// Cached existence flags of one shard, by full path.
pub type ShardMap = BTreeMap<String, bool>;

/// Identifies one of the [`SHARD_COUNT`] shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardKey(u8);

impl ShardKey {
    pub fn for_path(path: &str) -> Self {
        let digest = Sha256::digest(path.as_bytes());
        Self(digest[0] >> 4)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn as_char(self) -> char {
        char::from_digit(u32::from(self.0), 16).unwrap_or('0')
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..SHARD_COUNT as u8).map(Self)
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Key/value store holding shard maps.
///
/// Read failures are indistinguishable from misses; write failures are the
/// store's to report. Clones must share state.
pub trait ShardStore: Clone + Send + Sync + 'static {
    fn get(&self, key: ShardKey) -> Option<ShardMap>;

    fn put(&self, key: ShardKey, shard: ShardMap);
}

/// Positive-existence cache over a [`ShardStore`].
///
/// Shard updates are read-modify-write without locking; concurrent writers
/// to one shard race and the last `put` wins.
#[derive(Debug, Clone)]
pub struct ExistenceCache<S> {
    store: S,
}

impl<S: ShardStore> ExistenceCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached flag for `path`, `None` when the path was never recorded.
    pub fn lookup(&self, path: &str) -> Option<bool> {
        self.shard(ShardKey::for_path(path)).get(path).copied()
    }

    /// Record `path` as existing. The shard is only rewritten when the flag
    /// changes.
    pub fn mark_present(&self, path: &str) {
        let key = ShardKey::for_path(path);
        let mut shard = self.shard(key);

        if shard.get(path) == Some(&true) {
            return;
        }

        debug!(path = %path, shard = %key, "caching existence");
        shard.insert(path.to_owned(), true);
        self.store.put(key, shard);
    }

    /// Drop any cached flag for `path`.
    pub fn forget(&self, path: &str) {
        let key = ShardKey::for_path(path);
        let mut shard = self.shard(key);

        if shard.remove(path).is_some() {
            debug!(path = %path, shard = %key, "evicting existence");
            self.store.put(key, shard);
        }
    }

    fn shard(&self, key: ShardKey) -> ShardMap {
        self.store.get(key).unwrap_or_default()
    }
}
