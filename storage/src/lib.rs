//! Filesystem-style access to a CDN storage zone.
//!
//! [`RemoteObjectClient`] maps object operations onto the zone's HTTP API
//! (`PUT`, `DELETE`, `GET` with the access key in a header or query string).
//! [`CachingStorageAdapter`] layers the generic [`StorageAdapter`] contract on
//! top of it and keeps an [`ExistenceCache`] so that existence checks do not
//! cost a round trip once a path is known to exist.
//!
//! ```rust,ignore
//! use cdnfs_storage::{CachingStorageAdapter, Config, MemoryShardStore, StorageAdapter};
//!
//! let config = Config::init()?;
//! let adapter = CachingStorageAdapter::from_config(&config, MemoryShardStore::new())?;
//!
//! adapter.write("media/logo.svg", svg.into(), &Default::default()).await?;
//! assert!(adapter.exists("media/logo.svg").await);
//! ```

pub mod adapter;
pub mod cache;
pub mod client;
pub mod config;
pub mod stream;

pub use adapter::{
    AdapterError, CachingStorageAdapter, DirectoryEntry, EntryKind, InMemoryAdapter,
    ObjectMetadata, ReadObject, RenameOutcome, StorageAdapter, Visibility, WriteOptions,
    WrittenObject, guess_mime_type,
};
pub use cache::{
    ExistenceCache, FileShardStore, MemoryShardStore, SHARD_COUNT, ShardKey, ShardMap, ShardStore,
};
pub use client::{RawEntry, RemoteObjectClient, TransportError};
pub use config::Config;
pub use stream::{ByteSource, ObjectStream};
