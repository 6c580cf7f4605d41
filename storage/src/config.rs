use std::env::vars;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

/// Prefix of every environment variable read by [`Config::init`].
pub const ENV_PREFIX: &str = "CDNFS_";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// The final, validated configuration struct.
// `api_url` is guaranteed to be an http(s) URL ending in `/`.
#[derive(Clone)]
pub struct Config {
    api_url: String,
    api_key: String,
    media_url: Option<String>,
    host_initialized: bool,
    request_timeout: Duration,
    cache_dir: Option<PathBuf>,
}

// An intermediate struct for deserializing environment variables
// where most settings are optional.
#[derive(Deserialize)]
struct RawConfig {
    api_url: String,
    api_key: String,
    media_url: Option<String>,
    host_initialized: Option<bool>,
    request_timeout_secs: Option<u64>,
    cache_dir: Option<String>,
}

impl Config {
    /// Create a test configuration pointing at `api_url`.
    ///
    /// Intended for unit and integration tests against a mock server.
    pub fn new_for_test(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base(api_url.into()),
            api_key: "test-access-key".to_owned(),
            media_url: None,
            host_initialized: false,
            request_timeout: Duration::from_secs(5),
            cache_dir: None,
        }
    }

    /// Override the persistent cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref()
    }

    pub fn host_initialized(&self) -> bool {
        self.host_initialized
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Initializes configuration from `CDNFS_*` environment variables.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let prefixed = vars().filter_map(|(name, value)| {
            let name = name.strip_prefix(ENV_PREFIX)?.to_owned();
            Some((name, value))
        });

        // First, deserialize into a temporary struct that allows for optional fields
        let raw_config: RawConfig = serde_env::from_iter(prefixed)?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            api_url,
            api_key,
            media_url,
            host_initialized,
            request_timeout_secs,
            cache_dir,
        } = raw_config;

        let parsed = reqwest::Url::parse(&api_url)
            .map_err(|e| anyhow::anyhow!("{ENV_PREFIX}API_URL is not a valid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "{ENV_PREFIX}API_URL must use http or https, got {}",
                parsed.scheme()
            );
        }

        if api_key.trim().is_empty() {
            anyhow::bail!("{ENV_PREFIX}API_KEY must not be empty");
        }

        let request_timeout = match request_timeout_secs {
            Some(0) => anyhow::bail!("{ENV_PREFIX}REQUEST_TIMEOUT_SECS must be positive"),
            Some(secs) => Duration::from_secs(secs),
            None => {
                info!(
                    "REQUEST_TIMEOUT_SECS not set, defaulting to {}s",
                    DEFAULT_REQUEST_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
            }
        };

        let host_initialized = host_initialized.unwrap_or(false);
        if host_initialized {
            info!("Host initialized mode: existence checks always succeed");
        }

        Ok(Config {
            api_url: normalize_base(api_url),
            api_key,
            media_url: media_url.filter(|url| !url.is_empty()),
            host_initialized,
            request_timeout,
            cache_dir: cache_dir.filter(|dir| !dir.is_empty()).map(PathBuf::from),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("media_url", &self.media_url)
            .field("host_initialized", &self.host_initialized)
            .field("request_timeout", &self.request_timeout)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

fn normalize_base(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
