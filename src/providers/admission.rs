//! Counting admission control for provider calls.
//!
//! Bounds how many provider calls run at once. Excess callers suspend on a
//! `tokio::sync::Semaphore` (no worker thread is blocked) until a permit is
//! returned. The permit is an RAII guard and is returned however the body
//! ends, including when the future is dropped mid-flight.

use std::future::Future;

use tokio::sync::Semaphore;

/// Default number of concurrent provider calls.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Bounded admission gate.
pub struct AdmissionLimiter {
    semaphore: Semaphore,
    capacity: usize,
}

impl AdmissionLimiter {
    /// Create a limiter admitting up to `capacity` concurrent bodies.
    ///
    /// A capacity of zero would never admit anyone and is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Run `body` while holding a permit.
    ///
    /// No fairness is promised beyond every waiter eventually being
    /// admitted. Whatever `body` returns (including an `Err`) is passed
    /// through after the permit is released.
    pub async fn with_permit<F, Fut, T>(&self, body: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("admission semaphore is never closed");
        body().await
    }

    /// Maximum number of concurrent bodies.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for AdmissionLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }
}
