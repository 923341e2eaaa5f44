//! Anthropic Messages API client for recipe generation.
//!
//! Each [`generate`](AnthropicClient::generate) call is a single
//! `POST /v1/messages` round trip, made while holding an
//! [`AdmissionLimiter`] permit and under a hard deadline. When the deadline
//! fires, the request future is dropped: reqwest aborts the connection and
//! the permit is released by that same drop, so a timed-out call never
//! keeps occupying a slot.
//!
//! There is no retry here. Callers wanting one can wrap the client in
//! their own [`GenerateProvider`] decorator.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::admission::{AdmissionLimiter, DEFAULT_MAX_CONCURRENT_REQUESTS};
use super::traits::GenerateProvider;
use crate::telemetry;
use crate::{Result, SaucierError};

/// Default base URL for the Anthropic API.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model used for recipe generation.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// API version header value sent with every request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Provider name used in logs and metric labels.
const PROVIDER_NAME: &str = "anthropic";

/// Configuration for the provider client.
///
/// ```rust
/// # use saucier::ProviderConfig;
/// # use std::time::Duration;
/// let config = ProviderConfig::new()
///     .max_concurrent_requests(2)
///     .call_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_tokens, 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base URL. Default: `https://api.anthropic.com`.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Upper bound on generated tokens. Default: 1024.
    pub max_tokens: u32,
    /// Maximum concurrent in-flight calls. Default: 5.
    pub max_concurrent_requests: usize,
    /// Per-call deadline, counted from admission. Default: 30s.
    pub call_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL (useful for pointing at a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the generated-token limit.
    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n;
        self
    }

    /// Set the maximum number of concurrent calls.
    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n;
        self
    }

    /// Set the per-call deadline.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    call_timeout: Duration,
    limiter: AdmissionLimiter,
}

impl AnthropicClient {
    /// Create a client with the given API key and configuration.
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SaucierError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            call_timeout: config.call_timeout,
            limiter: AdmissionLimiter::new(config.max_concurrent_requests),
        })
    }

    /// The admission gate shared by all calls made through this client.
    pub fn limiter(&self) -> &AdmissionLimiter {
        &self.limiter
    }

    /// Generate text for `prompt`.
    ///
    /// Waits for an admission permit, then gives the request
    /// `call_timeout` to complete. Time spent waiting for the permit does
    /// not count against the deadline.
    #[instrument(skip(self, prompt), fields(provider = PROVIDER_NAME, model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let result = self
            .limiter
            .with_permit(|| async {
                match tokio::time::timeout(self.call_timeout, self.send(prompt)).await {
                    Ok(result) => result,
                    Err(_) => Err(SaucierError::Timeout {
                        after: self.call_timeout,
                    }),
                }
            })
            .await;

        match &result {
            Ok(_) => Self::record_request(start, "ok"),
            Err(e) if matches!(e, SaucierError::Timeout { .. }) => {
                warn!(error = %e, "provider call abandoned at deadline");
                Self::record_request(start, "timeout");
            }
            Err(e) => {
                warn!(error = %e, "provider call failed");
                Self::record_request(start, "error");
            }
        }
        result
    }

    /// One Messages API round trip.
    async fn send(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens: self.max_tokens,
                messages: [RequestMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SaucierError::Upstream(format!(
                "provider returned {status}: {body}"
            )));
        }

        let bytes = response.bytes().await?;
        let body: MessagesResponse = serde_json::from_slice(&bytes)?;
        first_text_block(body)
            .ok_or_else(|| SaucierError::Upstream("response contained no text block".to_string()))
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(start: Instant, status: &'static str) {
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => PROVIDER_NAME,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => PROVIDER_NAME,
        )
        .record(start.elapsed().as_secs_f64());
    }
}

fn first_text_block(body: MessagesResponse) -> Option<String> {
    body.content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerateProvider for AnthropicClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        AnthropicClient::generate(self, prompt).await
    }
}
