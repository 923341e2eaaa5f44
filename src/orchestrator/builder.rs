//! Builder for configuring orchestrator instances

use std::sync::Arc;
use std::time::Duration;

use super::RecipeOrchestrator;
use crate::cache::{CacheConfig, StampedeCache};
use crate::config::Config;
use crate::providers::{AnthropicClient, GenerateProvider, ProviderConfig};
use crate::{Result, SaucierError};

/// Main entry point for creating orchestrator instances.
pub struct Saucier;

impl Saucier {
    /// Create a new builder for configuring the orchestrator.
    pub fn builder() -> SaucierBuilder {
        SaucierBuilder::new()
    }
}

/// Builder for configuring orchestrator instances.
///
/// ```rust
/// # use saucier::Saucier;
/// # use std::time::Duration;
/// let orchestrator = Saucier::builder()
///     .anthropic("sk-ant-your-key")
///     .max_concurrent_requests(2)
///     .call_timeout(Duration::from_secs(15))
///     .build()?;
/// # Ok::<(), saucier::SaucierError>(())
/// ```
pub struct SaucierBuilder {
    anthropic_key: Option<String>,
    provider: Option<Arc<dyn GenerateProvider>>,
    provider_config: ProviderConfig,
    cache_config: CacheConfig,
}

impl SaucierBuilder {
    pub fn new() -> Self {
        Self {
            anthropic_key: None,
            provider: None,
            provider_config: ProviderConfig::default(),
            cache_config: CacheConfig::default(),
        }
    }

    /// Start from loaded configuration (cache and provider sections).
    ///
    /// The API key is not part of the file; set it with
    /// [`anthropic()`](Self::anthropic).
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider_config: config.provider_config(),
            cache_config: config.cache_config(),
            ..Self::new()
        }
    }

    /// Configure the Anthropic provider.
    pub fn anthropic(mut self, api_key: impl Into<String>) -> Self {
        self.anthropic_key = Some(api_key.into());
        self
    }

    /// Use a custom provider instead of the built-in HTTP client.
    ///
    /// Takes precedence over [`anthropic()`](Self::anthropic). Admission and
    /// deadline handling are then the provider's own responsibility.
    pub fn provider(mut self, provider: Arc<dyn GenerateProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.provider_config.base_url = url.into();
        self
    }

    /// Override the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.provider_config.model = model.into();
        self
    }

    /// Maximum concurrent provider calls.
    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.provider_config.max_concurrent_requests = n;
        self
    }

    /// Per-call provider deadline.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.provider_config.call_timeout = timeout;
        self
    }

    /// Replace the whole provider configuration.
    pub fn provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = config;
        self
    }

    /// Replace the cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Build the orchestrator.
    ///
    /// Fails with [`SaucierError::Configuration`] when no provider is set or
    /// the cache settings are out of range.
    pub fn build(self) -> Result<RecipeOrchestrator> {
        self.cache_config.validate()?;

        let provider: Arc<dyn GenerateProvider> = match (self.provider, self.anthropic_key) {
            (Some(provider), _) => provider,
            (None, Some(key)) => Arc::new(AnthropicClient::new(key, &self.provider_config)?),
            (None, None) => {
                return Err(SaucierError::Configuration(
                    "no provider configured: supply an API key or a provider".to_string(),
                ));
            }
        };

        Ok(RecipeOrchestrator::new(
            StampedeCache::new(&self.cache_config),
            provider,
        ))
    }
}

impl Default for SaucierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
