//! Provider trait for text generation.
//!
//! The orchestrator only depends on [`GenerateProvider`], so the HTTP
//! client can be swapped for a scripted provider in tests or wrapped by a
//! decorator (e.g. a retrying provider layered outside the client).

use async_trait::async_trait;

use crate::Result;

/// Provider that turns a prompt into raw text.
///
/// One call is one external request. Implementations report deadline
/// expiry as [`SaucierError::Timeout`](crate::SaucierError::Timeout) and
/// every other failure as
/// [`SaucierError::Upstream`](crate::SaucierError::Upstream).
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
