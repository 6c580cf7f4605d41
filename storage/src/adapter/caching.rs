//! Storage zone adapter with an existence cache.

use tracing::debug;

use super::listing::list_tree;
use super::traits::StorageAdapter;
use super::types::{
    AdapterError, DirectoryEntry, ObjectMetadata, Visibility, WriteOptions, WrittenObject,
};
use crate::cache::{ExistenceCache, ShardStore};
use crate::client::{RemoteObjectClient, join_url};
use crate::config::Config;
use crate::stream::{ByteSource, ObjectStream};

/// [`StorageAdapter`] over a [`RemoteObjectClient`].
///
/// Successful writes mark the path as existing and successful deletes evict
/// it, so `exists` only probes the zone for paths this process has not seen.
#[derive(Debug, Clone)]
pub struct CachingStorageAdapter<S> {
    client: RemoteObjectClient,
    cache: ExistenceCache<S>,
    host_initialized: bool,
    media_url: Option<String>,
}

impl<S: ShardStore> CachingStorageAdapter<S> {
    pub fn new(client: RemoteObjectClient, store: S) -> Self {
        Self {
            client,
            cache: ExistenceCache::new(store),
            host_initialized: false,
            media_url: None,
        }
    }

    pub fn from_config(config: &Config, store: S) -> reqwest::Result<Self> {
        let mut adapter = Self::new(RemoteObjectClient::from_config(config)?, store)
            .with_host_initialized(config.host_initialized());
        adapter.media_url = config.media_url().map(str::to_owned);
        Ok(adapter)
    }

    /// Once the host application is fully running, `exists` answers `true`
    /// without consulting the cache or the zone. Objects are then expected to
    /// exist already or to be created on demand.
    pub fn with_host_initialized(mut self, host_initialized: bool) -> Self {
        self.host_initialized = host_initialized;
        self
    }

    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self
    }

    pub fn client(&self) -> &RemoteObjectClient {
        &self.client
    }

    pub fn cache(&self) -> &ExistenceCache<S> {
        &self.cache
    }

    /// Public CDN URL for `path`, when a media URL is configured.
    pub fn public_url(&self, path: &str) -> Option<String> {
        self.media_url.as_deref().map(|base| join_url(base, path))
    }
}

impl<S: ShardStore> StorageAdapter for CachingStorageAdapter<S> {
    async fn write_stream(
        &self,
        path: &str,
        source: ByteSource,
        options: &WriteOptions,
    ) -> Result<WrittenObject, AdapterError> {
        self.client
            .put_object(path, source, options.mime_type.as_deref())
            .await
            .map_err(|source| AdapterError::Write {
                path: path.to_owned(),
                source,
            })?;

        self.cache.mark_present(path);

        let mut written = WrittenObject::file(path);
        written.mime_type = options.mime_type.clone();
        Ok(written)
    }

    async fn delete(&self, path: &str) -> Result<(), AdapterError> {
        self.client
            .delete_object(path)
            .await
            .map_err(|source| AdapterError::Delete {
                path: path.to_owned(),
                source,
            })?;

        self.cache.forget(path);
        Ok(())
    }

    async fn create_directory(
        &self,
        _path: &str,
        _options: &WriteOptions,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn set_visibility(
        &self,
        _path: &str,
        _visibility: Visibility,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        if self.host_initialized {
            return true;
        }

        // Query strings mark generated variants (e.g. thumbnails), which are
        // always served.
        if path.contains('?') {
            return true;
        }

        if let Some(cached) = self.cache.lookup(path) {
            return cached;
        }

        match self.client.probe_metadata(path).await {
            Ok(_) => {
                self.cache.mark_present(path);
                true
            }
            Err(e) => {
                debug!(path = %path, error = %e, "existence probe failed");
                false
            }
        }
    }

    async fn read_stream(&self, path: &str) -> Result<ObjectStream, AdapterError> {
        self.client
            .fetch_object_stream(path)
            .await
            .map_err(|source| AdapterError::Read {
                path: path.to_owned(),
                source,
            })
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<DirectoryEntry>, AdapterError> {
        list_tree(&self.client, directory, recursive)
            .await
            .map_err(|source| AdapterError::Listing {
                path: directory.to_owned(),
                source,
            })
    }

    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, AdapterError> {
        self.client
            .probe_metadata(path)
            .await
            .map_err(|source| AdapterError::Metadata {
                path: path.to_owned(),
                source,
            })
    }
}
