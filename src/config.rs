//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. Explicit path (e.g. `--config <path>`); must exist
//! 2. `~/.saucier/config.toml` (user)
//! 3. `/etc/saucier/config.toml` (system)
//! 4. Built-in defaults when no file is found
//!
//! Every option has a default, so an empty or missing file is valid. The
//! provider API key never comes from the file; it is read from the
//! `ANTHROPIC_API_KEY` environment variable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::providers::ProviderConfig;
use crate::providers::admission::DEFAULT_MAX_CONCURRENT_REQUESTS;
use crate::providers::anthropic::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::{Result, SaucierError};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Maximum cached entries (default: 1000).
    #[serde(default = "default_maximum_size")]
    pub maximum_size: u64,
    /// Entry time-to-live in seconds, from the last write (default: 3600).
    #[serde(default = "default_expire_after_write_secs")]
    pub expire_after_write_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            maximum_size: default_maximum_size(),
            expire_after_write_secs: default_expire_after_write_secs(),
        }
    }
}

fn default_maximum_size() -> u64 {
    1_000
}

fn default_expire_after_write_secs() -> u64 {
    60 * 60
}

/// `[provider]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Maximum concurrent provider calls (default: 5).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Per-call deadline in milliseconds (default: 30000).
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_concurrent_requests: default_max_concurrent(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error; otherwise a
    /// missing file falls back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SaucierError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            SaucierError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.cache_config().validate()?;
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SaucierError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".saucier").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/saucier/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Cache settings as a [`CacheConfig`].
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .maximum_size(self.cache.maximum_size)
            .expire_after_write(Duration::from_secs(self.cache.expire_after_write_secs))
    }

    /// Provider settings as a [`ProviderConfig`].
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new()
            .base_url(&self.provider.base_url)
            .model(&self.provider.model)
            .max_tokens(self.provider.max_tokens)
            .max_concurrent_requests(self.provider.max_concurrent_requests)
            .call_timeout(Duration::from_millis(self.provider.call_timeout_ms))
    }

    /// API key from the environment, if set and non-empty.
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
