//! Adapter value types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::client::TransportError;

/// Access level of an object. The storage zone has no ACLs, so every object
/// reports [`Visibility::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

/// Metadata derived from a probe's response headers. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub mime_type: Option<String>,
    pub visibility: Visibility,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub basename: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// Entry named `basename` inside `directory` (`""` is the root).
    pub fn new(directory: &str, basename: impl Into<String>, kind: EntryKind) -> Self {
        let basename = basename.into();
        let directory = directory.trim_end_matches('/');
        let path = if directory.is_empty() {
            basename.clone()
        } else {
            format!("{directory}/{basename}")
        };

        Self {
            basename,
            path,
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Options accepted by write operations.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Reported MIME type; guessed from the path and contents when unset.
    pub mime_type: Option<String>,
    /// Accepted for interface compatibility and ignored.
    pub visibility: Option<Visibility>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// Result of a successful write.
///
/// `contents` is only filled by buffered writes. `mime_type` is filled by
/// buffered writes, and by streamed writes given an explicit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenObject {
    pub path: String,
    pub kind: EntryKind,
    pub visibility: Visibility,
    pub contents: Option<Bytes>,
    pub mime_type: Option<String>,
}

impl WrittenObject {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            visibility: Visibility::Public,
            contents: None,
            mime_type: None,
        }
    }

    pub fn with_contents(mut self, contents: Bytes, mime_type: impl Into<String>) -> Self {
        self.contents = Some(contents);
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A fully read object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadObject {
    pub path: String,
    pub contents: Bytes,
}

/// Outcome of a rename that got at least as far as writing the new path.
///
/// Rename is a write followed by a delete and is not atomic.
#[derive(Debug)]
pub enum RenameOutcome {
    /// The new path was written and the old one deleted.
    Moved,
    /// The new path was written but deleting the old one failed; both exist.
    SourceRetained(AdapterError),
}

impl RenameOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved)
    }
}

/// Error type for adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to fetch metadata for {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to list {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to read upload source for {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object not found: {0}")]
    NotFound(String),
}

impl AdapterError {
    pub fn path(&self) -> &str {
        match self {
            Self::Write { path, .. }
            | Self::Delete { path, .. }
            | Self::Read { path, .. }
            | Self::Metadata { path, .. }
            | Self::Listing { path, .. }
            | Self::Source { path, .. }
            | Self::NotFound(path) => path,
        }
    }

    /// HTTP status behind the failure, if the zone answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Write { source, .. }
            | Self::Delete { source, .. }
            | Self::Read { source, .. }
            | Self::Metadata { source, .. }
            | Self::Listing { source, .. } => source.status(),
            Self::Source { .. } | Self::NotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_entry_paths() {
        let root = DirectoryEntry::new("", "a.png", EntryKind::File);
        assert_eq!(root.path, "a.png");

        let nested = DirectoryEntry::new("/media/", "thumbs", EntryKind::Directory);
        assert_eq!(nested.path, "/media/thumbs");
        assert_eq!(nested.basename, "thumbs");
        assert!(nested.is_dir());
    }

    #[test]
    fn test_directory_entry_serializes_type_field() {
        let entry = DirectoryEntry::new("a", "b", EntryKind::Directory);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "dir");
        assert_eq!(json["path"], "a/b");
    }

    #[test]
    fn test_write_options_builder() {
        let options = WriteOptions::new()
            .with_mime_type("image/png")
            .with_visibility(Visibility::Private);
        assert_eq!(options.mime_type.as_deref(), Some("image/png"));
        assert_eq!(options.visibility, Some(Visibility::Private));
    }

    #[test]
    fn test_adapter_error_exposes_path_and_status() {
        let err = AdapterError::Write {
            path: "a.png".to_owned(),
            source: TransportError::UnexpectedStatus {
                path: "a.png".to_owned(),
                status: 500,
            },
        };
        assert_eq!(err.path(), "a.png");
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().starts_with("failed to write a.png"));

        let missing = AdapterError::NotFound("b".to_owned());
        assert_eq!(missing.path(), "b");
        assert_eq!(missing.status(), None);
    }
}
