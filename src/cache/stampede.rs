//! Bounded, expiring cache that computes each missing value at most once
//! at a time.
//!
//! [`StampedeCache::get_or_compute`] uses double-checked locking:
//!
//! 1. Read the store without any lock. A hit returns immediately.
//! 2. Join the per-key lock for the key.
//! 3. Re-check the store under the lock, since another caller may have
//!    populated it while this one waited.
//! 4. Otherwise run the compute function, store the value and return it.
//!
//! Failures are never cached. A caller queued behind a failed computation
//! re-checks, misses, and runs its own computation in turn.
//!
//! Storage is moka's async cache: bounded by entry count (TinyLFU
//! admission, LRU eviction) with write-based expiry. Eviction is
//! independent of the per-key locks; a value evicted right after it was
//! computed is simply computed again by the next caller.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use super::key_lock::KeyLocks;
use crate::telemetry;
use crate::SaucierError;

/// Longest accepted time-to-live. moka refuses anything above 1000 years.
pub const MAX_EXPIRE_AFTER_WRITE: Duration = Duration::from_secs(1000 * 365 * 24 * 60 * 60);

/// Configuration for the recipe cache.
///
/// ```rust
/// # use saucier::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .maximum_size(5_000)
///     .expire_after_write(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 1,000.
    pub maximum_size: u64,
    /// Time-to-live measured from the last write. Default: 60 minutes.
    pub expire_after_write: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            maximum_size: 1_000,
            expire_after_write: Duration::from_secs(60 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn maximum_size(mut self, n: u64) -> Self {
        self.maximum_size = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn expire_after_write(mut self, ttl: Duration) -> Self {
        self.expire_after_write = ttl;
        self
    }

    /// Check the settings against what the store can represent.
    pub fn validate(&self) -> crate::Result<()> {
        if self.expire_after_write > MAX_EXPIRE_AFTER_WRITE {
            return Err(SaucierError::Configuration(format!(
                "cache expire_after_write of {}s exceeds the maximum of {}s",
                self.expire_after_write.as_secs(),
                MAX_EXPIRE_AFTER_WRITE.as_secs()
            )));
        }
        Ok(())
    }
}

/// In-memory memoizing cache with per-key stampede protection.
///
/// Keyed on canonical strings (see [`derive_key`](crate::key::derive_key)).
/// Safe to share across tasks behind an `Arc`.
pub struct StampedeCache<V> {
    store: Cache<String, V>,
    locks: KeyLocks,
}

impl<V> StampedeCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given configuration.
    ///
    /// A time-to-live above [`MAX_EXPIRE_AFTER_WRITE`] is clamped to it; use
    /// [`CacheConfig::validate`] to reject such settings instead.
    pub fn new(config: &CacheConfig) -> Self {
        let store = Cache::builder()
            .max_capacity(config.maximum_size)
            .time_to_live(config.expire_after_write.min(MAX_EXPIRE_AFTER_WRITE))
            .build();
        Self {
            store,
            locks: KeyLocks::new(),
        }
    }

    /// Point-in-time read. Never waits on a per-key lock.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.get(key).await
    }

    /// Insert or overwrite a value, restarting its time-to-live.
    pub async fn put(&self, key: impl Into<String>, value: V) {
        self.store.insert(key.into(), value).await;
    }

    /// Return the cached value for `key`, computing it on a miss.
    ///
    /// The boolean is `true` only for the caller whose `compute` produced
    /// the value. Concurrent callers for the same cold key run `compute`
    /// once between them; callers for different keys never wait on each
    /// other.
    ///
    /// If `compute` fails its error is returned and nothing is stored.
    /// Cancelling the returned future at any point releases this caller's
    /// hold on the per-key lock.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.store.get(key).await {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "path" => "fast").increment(1);
            return Ok((value, false));
        }

        let participant = self.locks.register(key);
        let _guard = participant.acquire().await;

        if let Some(value) = self.store.get(key).await {
            debug!(key, "populated while waiting for key lock");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "path" => "after_wait").increment(1);
            return Ok((value, false));
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        debug!(key, "cache miss, computing");
        match compute().await {
            Ok(value) => {
                metrics::counter!(telemetry::COMPUTATIONS_TOTAL, "status" => "ok").increment(1);
                self.store.insert(key.to_owned(), value.clone()).await;
                Ok((value, true))
            }
            Err(e) => {
                metrics::counter!(telemetry::COMPUTATIONS_TOTAL, "status" => "error").increment(1);
                debug!(key, "computation failed, nothing cached");
                Err(e)
            }
        }
    }

    /// Number of keys currently being resolved under a per-key lock.
    pub fn in_flight_keys(&self) -> usize {
        self.locks.len()
    }

    /// Approximate number of stored entries.
    ///
    /// Moka updates this lazily; call [`run_pending_tasks`](Self::run_pending_tasks)
    /// first for an up-to-date figure.
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }

    /// Apply pending evictions and expirations.
    pub async fn run_pending_tasks(&self) {
        self.store.run_pending_tasks().await;
    }

    /// Drop a single entry.
    pub async fn invalidate(&self, key: &str) {
        self.store.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.store.invalidate_all();
    }
}
