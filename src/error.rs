//! Saucier error types

use std::time::Duration;

/// Saucier error types
#[derive(Debug, thiserror::Error)]
pub enum SaucierError {
    // Provider/network errors
    /// The provider call did not finish before its deadline and was cancelled.
    #[error("provider call timed out after {after:?}")]
    Timeout { after: Duration },

    /// Any other provider failure, including transport errors and
    /// responses without usable text.
    #[error("upstream error: {0}")]
    Upstream(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SaucierError {
    /// Whether a caller layering its own retry policy should try again.
    ///
    /// Only deadline expiry is classified as retryable; upstream failures
    /// are not distinguished further.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SaucierError::Timeout { .. })
    }
}

impl From<reqwest::Error> for SaucierError {
    fn from(err: reqwest::Error) -> Self {
        SaucierError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for SaucierError {
    fn from(err: serde_json::Error) -> Self {
        SaucierError::Upstream(format!("malformed provider response: {err}"))
    }
}

/// Result type alias for Saucier operations
pub type Result<T> = std::result::Result<T, SaucierError>;
