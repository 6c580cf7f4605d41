//! Delete commands.

use anyhow::{Context as _, Result};
use cdnfs_storage::StorageAdapter as _;
use tracing::instrument;

use crate::context::Adapter;

#[instrument(skip_all, name = "rm", fields(remote = %remote))]
pub async fn run_rm(adapter: &Adapter, remote: &str) -> Result<()> {
    adapter
        .delete(remote)
        .await
        .with_context(|| format!("Failed to delete {remote}"))?;
    println!("deleted {remote}");
    Ok(())
}

#[instrument(skip_all, name = "rmdir", fields(remote = %remote))]
pub async fn run_rmdir(adapter: &Adapter, remote: &str) -> Result<()> {
    adapter
        .delete_directory(remote)
        .await
        .with_context(|| format!("Failed to delete directory {remote}"))?;
    println!("deleted {remote}/");
    Ok(())
}
