//! Request orchestration: key derivation, cache, provider, parsing.

mod builder;

pub use builder::{Saucier, SaucierBuilder};

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::cache::StampedeCache;
use crate::key::derive_key;
use crate::prompt::build_prompt;
use crate::providers::GenerateProvider;
use crate::telemetry;
use crate::types::RecipeResult;

/// Serves recipe searches from the cache, generating on a miss.
///
/// Construct with [`Saucier::builder()`]. Cheap to share behind an `Arc`;
/// all state is internally synchronized.
pub struct RecipeOrchestrator {
    cache: StampedeCache<String>,
    provider: Arc<dyn GenerateProvider>,
}

impl RecipeOrchestrator {
    pub(crate) fn new(cache: StampedeCache<String>, provider: Arc<dyn GenerateProvider>) -> Self {
        Self { cache, provider }
    }

    /// Find or generate a recipe for the given ingredients and restrictions.
    ///
    /// `was_cached` on the result is taken from the cache's own report of
    /// whether this call ran the provider, so it stays accurate when several
    /// callers race on the same cold key.
    ///
    /// Provider output that is not a well-formed recipe is returned in
    /// degraded form rather than as an error. Only provider failures
    /// ([`Timeout`](crate::SaucierError::Timeout),
    /// [`Upstream`](crate::SaucierError::Upstream)) are returned as `Err`.
    #[instrument(skip_all, fields(ingredients = ingredients.len(), restrictions = restrictions.len()))]
    pub async fn search<I, R>(&self, ingredients: &[I], restrictions: &[R]) -> Result<RecipeResult>
    where
        I: AsRef<str>,
        R: AsRef<str>,
    {
        let key = derive_key(ingredients, restrictions);
        let prompt = build_prompt(ingredients, restrictions);
        let provider = &self.provider;

        let (raw, was_computed) = self
            .cache
            .get_or_compute(&key, || async move { provider.generate(&prompt).await })
            .await?;
        let was_cached = !was_computed;
        debug!(key = %key, was_cached, "recipe resolved");

        Ok(match RecipeResult::parse(&raw, was_cached) {
            Some(recipe) => recipe,
            None => {
                warn!(key = %key, "provider output is not a structured recipe, returning raw text");
                metrics::counter!(telemetry::PARSE_DEGRADED_TOTAL).increment(1);
                RecipeResult::degraded(&raw, ingredients, was_cached)
            }
        })
    }

    /// The underlying cache, for observation and operator actions.
    pub fn cache(&self) -> &StampedeCache<String> {
        &self.cache
    }

    /// Name of the configured provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
