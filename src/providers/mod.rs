//! Provider implementations.
//!
//! [`AnthropicClient`] is the production provider: one HTTP round trip per
//! call, bounded by an [`AdmissionLimiter`] and a per-call deadline.

pub mod admission;
pub mod anthropic;
pub mod traits;

pub use admission::AdmissionLimiter;
pub use anthropic::{AnthropicClient, ProviderConfig};
pub use traits::GenerateProvider;
