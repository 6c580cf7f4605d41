//! In-memory adapter for host-layer tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use bytes::Bytes;

use super::mime::guess_mime_type;
use super::traits::StorageAdapter;
use super::types::{
    AdapterError, DirectoryEntry, EntryKind, ObjectMetadata, Visibility, WriteOptions,
    WrittenObject,
};
use crate::stream::{ByteSource, ObjectStream};

/// In-memory implementation of [`StorageAdapter`].
///
/// Paths are compared without their leading slash. Directories exist
/// implicitly under stored objects or explicitly via `create_directory`.
#[derive(Clone, Default)]
pub struct InMemoryAdapter {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    objects: HashMap<String, MemoryObject>,
    directories: BTreeSet<String>,
}

#[derive(Clone)]
struct MemoryObject {
    contents: Bytes,
    mime_type: String,
    timestamp: i64,
}

fn key(path: &str) -> &str {
    path.trim_matches('/')
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.write().expect("lock poisoned");
        state.objects.clear();
        state.directories.clear();
    }
}

impl MemoryState {
    fn is_directory(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        self.directories.contains(dir) || self.objects.keys().any(|k| k.starts_with(&prefix))
    }

    /// Direct children of `dir`, sorted by name.
    fn children(&self, dir: &str) -> BTreeMap<String, EntryKind> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut children = BTreeMap::new();
        let object_keys = self.objects.keys().map(|k| (k, EntryKind::File));
        let dir_keys = self.directories.iter().map(|k| (k, EntryKind::Directory));

        for (path, kind) in object_keys.chain(dir_keys) {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((name, _)) => {
                    children.insert(name.to_owned(), EntryKind::Directory);
                }
                None if !rest.is_empty() => {
                    children.entry(rest.to_owned()).or_insert(kind);
                }
                None => {}
            }
        }
        children
    }

    fn collect_tree(&self, directory: &str, recursive: bool, out: &mut Vec<DirectoryEntry>) {
        for (name, kind) in self.children(key(directory)) {
            let entry = DirectoryEntry::new(directory, name, kind);
            let descend = recursive && entry.is_dir();
            let path = entry.path.clone();
            out.push(entry);
            if descend {
                self.collect_tree(&path, true, out);
            }
        }
    }
}

impl StorageAdapter for InMemoryAdapter {
    async fn write_stream(
        &self,
        path: &str,
        source: ByteSource,
        options: &WriteOptions,
    ) -> Result<WrittenObject, AdapterError> {
        let contents = source
            .into_bytes()
            .await
            .map_err(|source| AdapterError::Source {
                path: path.to_owned(),
                source,
            })?;

        let mime_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_mime_type(path, &contents));

        let object = MemoryObject {
            contents,
            mime_type,
            timestamp: chrono::Utc::now().timestamp(),
        };

        let mut state = self.state.write().expect("lock poisoned");
        state.objects.insert(key(path).to_owned(), object);

        let mut written = WrittenObject::file(path);
        written.mime_type = options.mime_type.clone();
        Ok(written)
    }

    async fn delete(&self, path: &str) -> Result<(), AdapterError> {
        let mut state = self.state.write().expect("lock poisoned");
        let target = key(path);

        if state.objects.remove(target).is_some() {
            return Ok(());
        }

        if state.is_directory(target) {
            let prefix = format!("{target}/");
            state.objects.retain(|k, _| !k.starts_with(&prefix));
            state
                .directories
                .retain(|d| d != target && !d.starts_with(&prefix));
            return Ok(());
        }

        Err(AdapterError::NotFound(path.to_owned()))
    }

    async fn create_directory(
        &self,
        path: &str,
        _options: &WriteOptions,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.directories.insert(key(path).to_owned());
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
        let state = self.state.read().expect("lock poisoned");
        state.objects.contains_key(key(path)) || state.is_directory(key(path))
    }

    async fn read_stream(&self, path: &str) -> Result<ObjectStream, AdapterError> {
        let state = self.state.read().expect("lock poisoned");
        state
            .objects
            .get(key(path))
            .map(|object| ObjectStream::buffered(path, object.contents.clone()))
            .ok_or_else(|| AdapterError::NotFound(path.to_owned()))
    }

    async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<DirectoryEntry>, AdapterError> {
        let state = self.state.read().expect("lock poisoned");
        let mut entries = Vec::new();
        state.collect_tree(directory, recursive, &mut entries);
        Ok(entries)
    }

    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, AdapterError> {
        let state = self.state.read().expect("lock poisoned");
        let object = state
            .objects
            .get(key(path))
            .ok_or_else(|| AdapterError::NotFound(path.to_owned()))?;

        Ok(ObjectMetadata {
            path: path.to_owned(),
            kind: EntryKind::File,
            size: object.contents.len() as u64,
            timestamp: object.timestamp,
            mime_type: Some(object.mime_type.clone()),
            visibility: Visibility::Public,
        })
    }
}
