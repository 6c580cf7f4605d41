//! Filesystem-style adapters.
//!
//! [`StorageAdapter`] is the capability set a host storage layer programs
//! against. [`CachingStorageAdapter`] implements it over the storage zone;
//! [`InMemoryAdapter`] implements it in memory for tests.
//!
//! ```rust,ignore
//! async fn publish<A: StorageAdapter>(adapter: &A, path: &str, bytes: Bytes) -> Result<(), AdapterError> {
//!     adapter.update(path, bytes, &WriteOptions::default()).await?;
//!     match adapter.rename(path, &format!("{path}.published")).await? {
//!         RenameOutcome::Moved => Ok(()),
//!         RenameOutcome::SourceRetained(e) => Err(e),
//!     }
//! }
//! ```

mod caching;
mod listing;
mod memory;
mod mime;
mod traits;
mod types;

pub use caching::CachingStorageAdapter;
pub use memory::InMemoryAdapter;
pub use mime::guess_mime_type;
pub use traits::StorageAdapter;
pub use types::{
    AdapterError, DirectoryEntry, EntryKind, ObjectMetadata, ReadObject, RenameOutcome,
    Visibility, WriteOptions, WrittenObject,
};
