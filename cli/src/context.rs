//! Adapter construction shared by every command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use cdnfs_storage::{CachingStorageAdapter, Config, FileShardStore};
use tracing::{debug, instrument};

pub type Adapter = CachingStorageAdapter<FileShardStore>;

/// Shard files live under `CDNFS_CACHE_DIR`, or `<platform cache dir>/cdnfs`.
pub fn resolve_cache_dir(config: &Config) -> Result<PathBuf> {
    if let Some(dir) = config.cache_dir() {
        return Ok(dir.to_path_buf());
    }
    let base =
        dirs::cache_dir().context("Could not find a cache directory, set CDNFS_CACHE_DIR")?;
    Ok(base.join("cdnfs"))
}

/// Adapter over the zone in `config`, caching existence on disk.
pub fn build_adapter_with(config: &Config) -> Result<Adapter> {
    let dir = resolve_cache_dir(config)?;
    debug!(?config, cache_dir = %dir.display(), "building adapter");

    CachingStorageAdapter::from_config(config, FileShardStore::new(dir))
        .context("Failed to build HTTP client")
}

#[instrument(skip_all, name = "build_adapter")]
pub fn build_adapter() -> Result<Adapter> {
    let config = Config::init().context("Failed to load configuration")?;
    build_adapter_with(&config)
}
