//! Configuration module - credentials and upload settings

use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the general API key
pub const ENV_API_KEY: &str = "XAI_API_KEY";

/// Environment variable holding the management API key
pub const ENV_MANAGEMENT_API_KEY: &str = "XAI_MANAGEMENT_API_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://api.x.ai";
pub const DEFAULT_MANAGEMENT_BASE_URL: &str = "https://management-api.x.ai";

pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_RATE_LIMIT_INTERVAL_SECS: f64 = 0.3;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Uploads of large files can take a long time
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 3600;

/// API credentials
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub management_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"****")
            .field("management_api_key", &"****")
            .finish()
    }
}

impl Credentials {
    /// Build credentials, falling back to the API key when no management key is given
    pub fn new(api_key: String, management_api_key: Option<String>) -> Result<Self> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(anyhow!("{} cannot be empty", ENV_API_KEY));
        }

        let management_api_key = match management_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        {
            Some(key) => key,
            None => {
                warn!(
                    "{} not set, using {} for collection management (some operations may be rejected)",
                    ENV_MANAGEMENT_API_KEY, ENV_API_KEY
                );
                api_key.clone()
            }
        };

        Ok(Self {
            api_key,
            management_api_key,
        })
    }

    /// Read credentials from the environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| anyhow!("{} environment variable is not set", ENV_API_KEY))?;
        let management_api_key = std::env::var(ENV_MANAGEMENT_API_KEY).ok();
        Self::new(api_key, management_api_key)
    }
}

/// Optional configuration parameters for Config::new()
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub max_workers: Option<usize>,
    pub rate_limit_interval_secs: Option<f64>,
    pub max_retries: Option<u32>,
    pub backoff_multiplier: Option<f64>,
    pub max_file_size: Option<u64>,
    /// Replaces the default skip set when non-empty
    pub skip_extensions: Vec<String>,
    pub api_base_url: Option<String>,
    pub management_base_url: Option<String>,
    pub upload_timeout_secs: Option<u64>,
    pub assume_yes: bool,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub collection_id: String,
    pub sources: Vec<PathBuf>,
    pub credentials: Credentials,
    pub api_base_url: String,
    pub management_base_url: String,
    pub max_workers: usize,
    pub rate_limit_interval_secs: f64,
    pub max_retries: u32,
    pub backoff_multiplier: f64,
    pub max_file_size: Option<u64>,
    pub skip_extensions: HashSet<String>,
    pub upload_timeout_secs: u64,
    pub assume_yes: bool,
}

impl Config {
    /// Create a new Config, validating sources and tuning values
    pub fn new(
        collection_id: String,
        sources: Vec<PathBuf>,
        credentials: Credentials,
        options: ConfigOptions,
    ) -> Result<Arc<Self>> {
        let collection_id = collection_id.trim().to_string();
        if collection_id.is_empty() {
            return Err(anyhow!("collection_id cannot be empty"));
        }

        if sources.is_empty() {
            return Err(anyhow!("at least one source directory is required"));
        }

        let invalid: Vec<String> = sources
            .iter()
            .filter(|p| !p.is_dir())
            .map(|p| p.display().to_string())
            .collect();
        if !invalid.is_empty() {
            return Err(anyhow!(
                "source directories are missing or not directories: {}",
                invalid.join(", ")
            ));
        }

        let rate_limit_interval_secs = options
            .rate_limit_interval_secs
            .unwrap_or(DEFAULT_RATE_LIMIT_INTERVAL_SECS);
        if !rate_limit_interval_secs.is_finite() {
            return Err(anyhow!("rate_limit_interval must be a finite number"));
        }

        let max_retries = options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries == 0 {
            return Err(anyhow!("max_retries must be at least 1"));
        }

        let backoff_multiplier = options
            .backoff_multiplier
            .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER);
        if !backoff_multiplier.is_finite() || backoff_multiplier < 0.0 {
            return Err(anyhow!("backoff_multiplier must be a non-negative number"));
        }

        let skip_extensions = if options.skip_extensions.is_empty() {
            default_skip_extensions()
        } else {
            options
                .skip_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect()
        };

        Ok(Arc::new(Self {
            collection_id,
            sources,
            credentials,
            api_base_url: normalize_base_url(
                options
                    .api_base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_API_BASE_URL),
            )?,
            management_base_url: normalize_base_url(
                options
                    .management_base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_MANAGEMENT_BASE_URL),
            )?,
            max_workers: options.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1),
            rate_limit_interval_secs,
            max_retries,
            backoff_multiplier,
            max_file_size: options.max_file_size,
            skip_extensions,
            upload_timeout_secs: options
                .upload_timeout_secs
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
            assume_yes: options.assume_yes,
        }))
    }

    /// Minimum spacing between request starts (zero when pacing is disabled)
    pub fn rate_limit_interval(&self) -> Duration {
        secs_to_duration(self.rate_limit_interval_secs)
    }
}

/// Convert fractional seconds to a Duration, treating non-positive values as zero
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

/// Add a scheme when missing and strip trailing slashes
fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim();
    let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("https://{}", base_url)
    };

    let base_url = base_url.trim_end_matches('/').to_string();
    if base_url == "https:" || base_url == "http:" || base_url.ends_with("://") {
        return Err(anyhow!("base_url cannot be empty"));
    }

    Ok(base_url)
}

/// Lowercase an extension and make sure it starts with a dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Default skipped file extensions
fn default_skip_extensions() -> HashSet<String> {
    [
        ".tmp",
        ".temp",
        ".log",
        ".cache",
        ".swp",
        ".ds_store",
        ".git",
        ".gitignore",
        ".env",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
