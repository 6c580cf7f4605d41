//! Directory listing with optional depth-first recursion.

use std::collections::VecDeque;

use super::types::{DirectoryEntry, EntryKind};
use crate::client::{RawEntry, RemoteObjectClient, TransportError};

struct Level {
    directory: String,
    pending: VecDeque<RawEntry>,
}

/// List `directory`, one request per directory visited.
///
/// With `recursive`, each subdirectory's entries follow the subdirectory
/// itself, before its next sibling (pre-order). There is no cycle detection.
pub(crate) async fn list_tree(
    client: &RemoteObjectClient,
    directory: &str,
    recursive: bool,
) -> Result<Vec<DirectoryEntry>, TransportError> {
    let mut entries = Vec::new();
    let mut stack = vec![Level {
        directory: directory.to_owned(),
        pending: client.list_directory(directory).await?.into(),
    }];

    while let Some(level) = stack.last_mut() {
        let Some(raw) = level.pending.pop_front() else {
            stack.pop();
            continue;
        };

        let kind = if raw.is_directory {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let entry = DirectoryEntry::new(&level.directory, raw.object_name, kind);

        if recursive && entry.is_dir() {
            let children = client.list_directory(&entry.path).await?;
            stack.push(Level {
                directory: entry.path.clone(),
                pending: children.into(),
            });
        }

        entries.push(entry);
    }

    Ok(entries)
}
