//! Saucier - stampede-safe recipe generation cache
//!
//! This crate turns an expensive, rate-limited LLM call (generating a
//! recipe from a list of ingredients) into a cheap, idempotent lookup:
//!
//! - [`key::derive_key`] maps a request to an order- and case-independent
//!   cache key.
//! - [`StampedeCache`] memoizes results with bounded size and TTL, and
//!   runs at most one computation per key at a time.
//! - [`AnthropicClient`] calls the provider under a bounded number of
//!   concurrent requests and a hard per-call deadline.
//! - [`RecipeOrchestrator`] ties them together and reports whether each
//!   result came from the cache.
//!
//! # Example
//!
//! ```rust,no_run
//! use saucier::Saucier;
//!
//! #[tokio::main]
//! async fn main() -> saucier::Result<()> {
//!     let orchestrator = Saucier::builder()
//!         .anthropic("sk-ant-your-key")
//!         .build()?;
//!
//!     let recipe = orchestrator.search(&["chicken", "rice"], &["gluten-free"]).await?;
//!     println!("{} (cached: {})", recipe.title, recipe.was_cached);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, MAX_EXPIRE_AFTER_WRITE, StampedeCache};
pub use config::Config;
pub use error::{Result, SaucierError};
pub use orchestrator::{RecipeOrchestrator, Saucier, SaucierBuilder};
pub use providers::{AdmissionLimiter, AnthropicClient, GenerateProvider, ProviderConfig};
pub use types::RecipeResult;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
