//! HTTP client for the storage zone API.
//!
//! Write, delete and listing requests authenticate with an access key header.
//! Reads and metadata probes pass the key as the `AccessKey` query parameter,
//! which is what the zone's read path authorizes against.

use std::time::Duration;

use chrono::DateTime;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, LAST_MODIFIED};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapter::{EntryKind, ObjectMetadata, Visibility};
use crate::config::Config;
use crate::stream::{ByteSource, ObjectStream};

/// Failure talking to the storage zone.
///
/// Messages name the object path only; request URLs may carry the access key.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request for {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for {path}")]
    UnexpectedStatus { path: String, status: u16 },

    #[error("malformed response for {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl TransportError {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Malformed { .. } => None,
        }
    }
}

/// One entry of a directory listing response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEntry {
    pub object_name: String,
    pub is_directory: bool,
}

/// Stateless client for one storage zone.
#[derive(Clone)]
pub struct RemoteObjectClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl RemoteObjectClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            access_key: access_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(config.api_url(), config.api_key(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url + path` with exactly one slash between them.
    pub fn object_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Upload `source` to `path`. Only `201 Created` counts as success.
    ///
    /// `content_type` is sent as `Content-Type` when given; otherwise the zone
    /// derives it from the path.
    pub async fn put_object(
        &self,
        path: &str,
        source: ByteSource,
        content_type: Option<&str>,
    ) -> Result<(), TransportError> {
        let length = source.len();
        debug!(path = %path, length, content_type = ?content_type, "PUT object");

        let mut request = self
            .http
            .put(self.object_url(path))
            .header("accesskey", &self.access_key)
            .header(CONTENT_LENGTH, length);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request
            .body(source.into_body())
            .send()
            .await
            .map_err(|source| request_error(path, source))?;

        expect_status(path, response.status(), StatusCode::CREATED)
    }

    /// Delete the object (or directory) at `path`. Only `200 OK` counts as success.
    pub async fn delete_object(&self, path: &str) -> Result<(), TransportError> {
        debug!(path = %path, "DELETE object");

        let response = self
            .http
            .delete(self.object_url(path))
            .header(CONTENT_TYPE, "application/json")
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|source| request_error(path, source))?;

        expect_status(path, response.status(), StatusCode::OK)
    }

    /// Open the object at `path` for reading.
    pub async fn fetch_object_stream(&self, path: &str) -> Result<ObjectStream, TransportError> {
        debug!(path = %path, "GET object");

        let response = self.get_with_query_key(path).await?;
        expect_status(path, response.status(), StatusCode::OK)?;

        Ok(ObjectStream::remote(path, response))
    }

    /// Derive metadata from the response headers of a read request.
    ///
    /// The body is never consumed; the connection is dropped once the headers
    /// are parsed.
    pub async fn probe_metadata(&self, path: &str) -> Result<ObjectMetadata, TransportError> {
        debug!(path = %path, "probe metadata");

        let response = self.get_with_query_key(path).await?;
        expect_status(path, response.status(), StatusCode::OK)?;

        Ok(metadata_from_headers(path, response.headers()))
    }

    /// List the direct children of the directory at `path`.
    pub async fn list_directory(&self, path: &str) -> Result<Vec<RawEntry>, TransportError> {
        debug!(path = %path, "list directory");

        let url = format!("{}/", self.object_url(path).trim_end_matches('/'));
        let response = self
            .http
            .get(url)
            .header("accesskey", &self.access_key)
            .send()
            .await
            .map_err(|source| request_error(path, source))?;

        expect_status(path, response.status(), StatusCode::OK)?;

        let body = response
            .bytes()
            .await
            .map_err(|source| request_error(path, source))?;

        serde_json::from_slice(&body).map_err(|e| TransportError::Malformed {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    async fn get_with_query_key(&self, path: &str) -> Result<reqwest::Response, TransportError> {
        self.http
            .get(self.object_url(path))
            .query(&[("AccessKey", self.access_key.as_str())])
            .send()
            .await
            .map_err(|source| request_error(path, source))
    }
}

impl std::fmt::Debug for RemoteObjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteObjectClient")
            .field("base_url", &self.base_url)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Download URLs carry the access key, so the URL is stripped from the error.
fn request_error(path: &str, source: reqwest::Error) -> TransportError {
    let source = source.without_url();
    warn!(path = %path, error = %source, "storage request failed");
    TransportError::Request {
        path: path.to_owned(),
        source,
    }
}

fn expect_status(
    path: &str,
    actual: StatusCode,
    expected: StatusCode,
) -> Result<(), TransportError> {
    if actual == expected {
        return Ok(());
    }

    warn!(
        path = %path,
        status = actual.as_u16(),
        expected = expected.as_u16(),
        "unexpected status"
    );
    Err(TransportError::UnexpectedStatus {
        path: path.to_owned(),
        status: actual.as_u16(),
    })
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Missing or unparsable headers fall back to zero / `None`.
fn metadata_from_headers(path: &str, headers: &HeaderMap) -> ObjectMetadata {
    let timestamp = header_str(headers, LAST_MODIFIED)
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|t| t.timestamp())
        .unwrap_or(0);

    let size = header_str(headers, CONTENT_LENGTH)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    ObjectMetadata {
        path: path.to_owned(),
        kind: EntryKind::File,
        size,
        timestamp,
        mime_type: header_str(headers, CONTENT_TYPE).map(str::to_owned),
        visibility: Visibility::Public,
    }
}
