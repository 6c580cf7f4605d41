//! Storage adapter trait.

use std::future::Future;

use bytes::Bytes;

use super::mime::guess_mime_type;
use super::types::{
    AdapterError, DirectoryEntry, ObjectMetadata, ReadObject, RenameOutcome, Visibility,
    WriteOptions, WrittenObject,
};
use crate::stream::{ByteSource, ObjectStream};

/// Filesystem-style operations a host storage layer expects from an adapter.
///
/// Implementors provide the primitives; compound operations (`update`,
/// `rename`, `copy`) are provided here as sequences of primitives with no
/// atomicity. Failures are returned as values and never retried.
///
/// See [module documentation](super) for usage examples.
pub trait StorageAdapter: Clone + Send + Sync + 'static {
    fn write_stream(
        &self,
        path: &str,
        source: ByteSource,
        options: &WriteOptions,
    ) -> impl Future<Output = Result<WrittenObject, AdapterError>> + Send;

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// The zone has no directory primitive; implementations may no-op.
    fn create_directory(
        &self,
        path: &str,
        options: &WriteOptions,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// The zone has no ACL primitive; implementations may no-op.
    fn set_visibility(
        &self,
        path: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    fn exists(&self, path: &str) -> impl Future<Output = bool> + Send;

    fn read_stream(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<ObjectStream, AdapterError>> + Send;

    fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> impl Future<Output = Result<Vec<DirectoryEntry>, AdapterError>> + Send;

    fn get_metadata(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<ObjectMetadata, AdapterError>> + Send;

    /// Buffered write. The result carries the contents and a MIME type,
    /// explicit in `options` or guessed from the path and contents.
    fn write(
        &self,
        path: &str,
        contents: Bytes,
        options: &WriteOptions,
    ) -> impl Future<Output = Result<WrittenObject, AdapterError>> + Send {
        async move {
            let written = self
                .write_stream(path, ByteSource::from_bytes(contents.clone()), options)
                .await?;

            let mime_type = options
                .mime_type
                .clone()
                .unwrap_or_else(|| guess_mime_type(path, &contents));

            Ok(written.with_contents(contents, mime_type))
        }
    }

    /// Delete then write. A failed delete (e.g. nothing to delete) does not
    /// stop the write.
    fn update(
        &self,
        path: &str,
        contents: Bytes,
        options: &WriteOptions,
    ) -> impl Future<Output = Result<WrittenObject, AdapterError>> + Send {
        async move {
            let _ignored = self.delete(path).await;
            self.write(path, contents, options).await
        }
    }

    fn update_stream(
        &self,
        path: &str,
        source: ByteSource,
        options: &WriteOptions,
    ) -> impl Future<Output = Result<WrittenObject, AdapterError>> + Send {
        async move {
            let _ignored = self.delete(path).await;
            self.write_stream(path, source, options).await
        }
    }

    /// Read `path` into memory, write it to `new_path`, then delete `path`.
    ///
    /// Read and write failures are errors. A failed delete after a successful
    /// write is reported as [`RenameOutcome::SourceRetained`].
    fn rename(
        &self,
        path: &str,
        new_path: &str,
    ) -> impl Future<Output = Result<RenameOutcome, AdapterError>> + Send {
        async move {
            self.copy(path, new_path).await?;

            match self.delete(path).await {
                Ok(()) => Ok(RenameOutcome::Moved),
                Err(e) => Ok(RenameOutcome::SourceRetained(e)),
            }
        }
    }

    /// Read `path` into memory and write it to `new_path`.
    fn copy(
        &self,
        path: &str,
        new_path: &str,
    ) -> impl Future<Output = Result<WrittenObject, AdapterError>> + Send {
        async move {
            let object = self.read(path).await?;
            self.write(new_path, object.contents, &WriteOptions::default())
                .await
        }
    }

    /// Directories and objects are deleted the same way.
    fn delete_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        self.delete(path)
    }

    /// Drain [`read_stream`](Self::read_stream) into memory.
    fn read(&self, path: &str) -> impl Future<Output = Result<ReadObject, AdapterError>> + Send {
        async move {
            let stream = self.read_stream(path).await?;
            let path = stream.path().to_owned();
            let contents = stream
                .collect()
                .await
                .map_err(|source| AdapterError::Read {
                    path: path.clone(),
                    source,
                })?;

            Ok(ReadObject { path, contents })
        }
    }

    fn get_size(&self, path: &str) -> impl Future<Output = Result<u64, AdapterError>> + Send {
        async move { Ok(self.get_metadata(path).await?.size) }
    }

    fn get_mime_type(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<String>, AdapterError>> + Send {
        async move { Ok(self.get_metadata(path).await?.mime_type) }
    }

    fn get_timestamp(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<i64, AdapterError>> + Send {
        async move { Ok(self.get_metadata(path).await?.timestamp) }
    }

    /// Always public; no request is made.
    fn get_visibility(&self, _path: &str) -> Visibility {
        Visibility::Public
    }
}
