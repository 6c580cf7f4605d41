//! Read-only commands: `ls`, `stat`, `exists`, `url`.

use anyhow::{Context as _, Result};
use cdnfs_storage::{DirectoryEntry, ObjectMetadata, StorageAdapter as _};
use chrono::DateTime;
use tracing::instrument;

use crate::context::Adapter;

#[instrument(skip_all, name = "ls", fields(dir = %dir, recursive))]
pub async fn run_ls(adapter: &Adapter, dir: &str, recursive: bool) -> Result<()> {
    let entries = adapter
        .list_contents(dir, recursive)
        .await
        .with_context(|| format!("Failed to list {dir:?}"))?;

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &DirectoryEntry) -> String {
    if entry.is_dir() {
        format!("{}/", entry.path)
    } else {
        entry.path.clone()
    }
}

#[instrument(skip_all, name = "stat", fields(remote = %remote))]
pub async fn run_stat(adapter: &Adapter, remote: &str) -> Result<()> {
    let metadata = adapter
        .get_metadata(remote)
        .await
        .with_context(|| format!("Failed to stat {remote}"))?;

    print!("{}", format_metadata(&metadata));
    Ok(())
}

fn format_metadata(metadata: &ObjectMetadata) -> String {
    let modified = DateTime::from_timestamp(metadata.timestamp, 0)
        .map_or_else(|| "-".to_owned(), |t| t.to_rfc3339());

    format!(
        "path:       {}\nsize:       {}\ntype:       {}\nmodified:   {}\nvisibility: {}\n",
        metadata.path,
        metadata.size,
        metadata.mime_type.as_deref().unwrap_or("-"),
        modified,
        metadata.visibility.as_str(),
    )
}

/// Process exit status for `exists`: 0 when present, 1 otherwise.
pub fn exit_status(exists: bool) -> u8 {
    u8::from(!exists)
}

/// Returns whether `remote` exists; see [`exit_status`].
#[instrument(skip_all, name = "exists", fields(remote = %remote))]
pub async fn run_exists(adapter: &Adapter, remote: &str) -> bool {
    let exists = adapter.exists(remote).await;
    println!("{}", if exists { "yes" } else { "no" });
    exists
}

pub fn run_url(adapter: &Adapter, remote: &str) -> Result<()> {
    let url = adapter
        .public_url(remote)
        .context("CDNFS_MEDIA_URL is not set")?;
    println!("{url}");
    Ok(())
}
