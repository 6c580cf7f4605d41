//! Upload sources and download streams.

use std::path::Path;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt as _};
use tokio_util::io::ReaderStream;

use crate::client::TransportError;

type BoxedReader = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Bytes to upload, together with their length.
///
/// The storage zone does not accept chunked uploads, so the length must be
/// known before the request starts.
pub struct ByteSource {
    body: SourceBody,
    length: u64,
}

enum SourceBody {
    Buffered(Bytes),
    Reader(BoxedReader),
}

impl ByteSource {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            length: bytes.len() as u64,
            body: SourceBody::Buffered(bytes),
        }
    }

    /// Wrap a reader that yields exactly `length` bytes.
    pub fn from_reader<R>(reader: R, length: u64) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self {
            body: SourceBody::Reader(Box::new(reader)),
            length,
        }
    }

    /// Open a local file, taking the length from its metadata.
    pub async fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        Ok(Self::from_reader(file, length))
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Read the whole source into memory.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self.body {
            SourceBody::Buffered(bytes) => Ok(bytes),
            SourceBody::Reader(mut reader) => {
                let mut buf = Vec::with_capacity(usize::try_from(self.length).unwrap_or(0));
                reader.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }

    pub(crate) fn into_body(self) -> reqwest::Body {
        match self.body {
            SourceBody::Buffered(bytes) => reqwest::Body::from(bytes),
            SourceBody::Reader(reader) => reqwest::Body::wrap_stream(ReaderStream::new(reader)),
        }
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.body {
            SourceBody::Buffered(_) => "buffered",
            SourceBody::Reader(_) => "reader",
        };
        f.debug_struct("ByteSource")
            .field("kind", &kind)
            .field("length", &self.length)
            .finish()
    }
}

/// A readable object opened on the storage zone (or in memory).
///
/// Dropping the stream releases the underlying connection.
pub struct ObjectStream {
    path: String,
    body: StreamBody,
}

enum StreamBody {
    Remote(reqwest::Response),
    Buffered(Option<Bytes>),
}

impl ObjectStream {
    pub(crate) fn remote(path: impl Into<String>, response: reqwest::Response) -> Self {
        Self {
            path: path.into(),
            body: StreamBody::Remote(response),
        }
    }

    pub fn buffered(path: impl Into<String>, contents: Bytes) -> Self {
        Self {
            path: path.into(),
            body: StreamBody::Buffered(Some(contents)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next chunk of the object, `None` once drained.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        match &mut self.body {
            StreamBody::Remote(response) => {
                response
                    .chunk()
                    .await
                    .map_err(|source| TransportError::Request {
                        path: self.path.clone(),
                        source: source.without_url(),
                    })
            }
            StreamBody::Buffered(contents) => Ok(contents.take()),
        }
    }

    /// Drain the remaining chunks into one buffer and close the stream.
    pub async fn collect(mut self) -> Result<Bytes, TransportError> {
        if let StreamBody::Buffered(contents) = &mut self.body {
            return Ok(contents.take().unwrap_or_default());
        }

        let mut buf = Vec::new();
        while let Some(chunk) = self.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(buf))
    }
}

impl std::fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStream")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
