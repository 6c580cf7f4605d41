//! Commands that move object bytes: `put`, `get`, `cp`, `mv`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use cdnfs_storage::{ByteSource, RenameOutcome, StorageAdapter as _, WriteOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tracing::{info, instrument, warn};

use crate::context::Adapter;

#[instrument(skip_all, name = "put", fields(remote = %remote))]
pub async fn run_put(
    adapter: &Adapter,
    local: &Path,
    remote: &str,
    mime_type: Option<String>,
) -> Result<()> {
    let source = ByteSource::from_file(local)
        .await
        .with_context(|| format!("Failed to open {}", local.display()))?;
    let length = source.len();

    let mut options = WriteOptions::new();
    if let Some(mime_type) = mime_type {
        options = options.with_mime_type(mime_type);
    }

    adapter
        .write_stream(remote, source, &options)
        .await
        .with_context(|| format!("Failed to upload {remote}"))?;

    info!(length, "uploaded");
    println!("{} -> {remote} ({length} bytes)", local.display());
    Ok(())
}

#[instrument(skip_all, name = "get", fields(remote = %remote))]
pub async fn run_get(adapter: &Adapter, remote: &str, output: Option<PathBuf>) -> Result<()> {
    let stream = adapter
        .read_stream(remote)
        .await
        .with_context(|| format!("Failed to read {remote}"))?;

    let written = match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            drain(stream, &mut file).await?
        }
        None => drain(stream, &mut tokio::io::stdout()).await?,
    };

    info!(written, "downloaded");
    Ok(())
}

async fn drain<W>(mut stream: cdnfs_storage::ObjectStream, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = stream
        .chunk()
        .await
        .with_context(|| format!("Failed while reading {}", stream.path()))?
    {
        out.write_all(&chunk).await.context("Failed to write output")?;
        written += chunk.len() as u64;
    }
    out.flush().await.context("Failed to flush output")?;
    Ok(written)
}

#[instrument(skip_all, name = "cp", fields(from = %from, to = %to))]
pub async fn run_cp(adapter: &Adapter, from: &str, to: &str) -> Result<()> {
    let written = adapter
        .copy(from, to)
        .await
        .with_context(|| format!("Failed to copy {from} to {to}"))?;

    println!("{from} -> {}", written.path);
    Ok(())
}

#[instrument(skip_all, name = "mv", fields(from = %from, to = %to))]
pub async fn run_mv(adapter: &Adapter, from: &str, to: &str) -> Result<()> {
    let outcome = adapter
        .rename(from, to)
        .await
        .with_context(|| format!("Failed to move {from} to {to}"))?;

    match outcome {
        RenameOutcome::Moved => println!("{from} -> {to}"),
        RenameOutcome::SourceRetained(e) => {
            warn!(error = %e, "source was not deleted");
            println!("{from} -> {to} (source retained: {e})");
        }
    }
    Ok(())
}
