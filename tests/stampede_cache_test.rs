//! Tests for [`StampedeCache`]: single-flight computation, lock
//! bookkeeping, failure and cancellation handling, size/TTL bounds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Barrier, Notify};

use saucier::{CacheConfig, MAX_EXPIRE_AFTER_WRITE, SaucierError, StampedeCache};

fn new_cache() -> Arc<StampedeCache<String>> {
    Arc::new(StampedeCache::new(&CacheConfig::default()))
}

/// Poll until `cond` holds or a second passes.
async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// =========================================================================
// CacheConfig
// =========================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.maximum_size, 1_000);
    assert_eq!(config.expire_after_write, Duration::from_secs(3600));
}

#[test]
fn cache_config_builder() {
    let config = CacheConfig::new()
        .maximum_size(500)
        .expire_after_write(Duration::from_secs(60));
    assert_eq!(config.maximum_size, 500);
    assert_eq!(config.expire_after_write, Duration::from_secs(60));
}

#[test]
fn cache_config_rejects_ttl_beyond_limit() {
    let config = CacheConfig::new().expire_after_write(Duration::from_secs(100_000_000_000));
    assert!(matches!(
        config.validate(),
        Err(SaucierError::Configuration(_))
    ));
    assert!(
        CacheConfig::new()
            .expire_after_write(MAX_EXPIRE_AFTER_WRITE)
            .validate()
            .is_ok()
    );
}

#[tokio::test]
async fn oversized_ttl_is_clamped_on_construction() {
    let config = CacheConfig::new().expire_after_write(Duration::MAX);
    let cache: StampedeCache<String> = StampedeCache::new(&config);
    cache.put("k", "v".to_string()).await;
    assert_eq!(cache.get("k").await.as_deref(), Some("v"));
}

// =========================================================================
// Basic get / put / get_or_compute
// =========================================================================

#[tokio::test]
async fn miss_then_hit() {
    let cache = new_cache();

    let (value, computed) = cache
        .get_or_compute("k", || async { Ok::<_, SaucierError>("v".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "v");
    assert!(computed);

    let calls = AtomicU32::new(0);
    let (value, computed) = cache
        .get_or_compute("k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, SaucierError>(String::new())
        })
        .await
        .unwrap();
    assert_eq!(value, "v");
    assert!(!computed);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(cache.get("k").await.as_deref(), Some("v"));
}

#[tokio::test]
async fn put_overwrites() {
    let cache = new_cache();
    cache.put("k", "one".to_string()).await;
    cache.put("k", "two".to_string()).await;

    assert_eq!(cache.get("k").await.as_deref(), Some("two"));

    let (value, computed) = cache
        .get_or_compute("k", || async { Ok::<_, SaucierError>("three".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "two");
    assert!(!computed);
}

#[tokio::test]
async fn get_on_missing_key_is_none() {
    let cache = new_cache();
    assert!(cache.get("absent").await.is_none());
    assert_eq!(cache.in_flight_keys(), 0);
}

// =========================================================================
// Stampede protection
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_compute_once() {
    let cache = new_cache();
    let calls = Arc::new(AtomicU32::new(0));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_compute("hot", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, SaucierError>("shared".to_string())
                    })
                    .await
            })
        })
        .collect();

    let results: Vec<(String, bool)> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|(value, _)| value == "shared"));
    assert_eq!(results.iter().filter(|(_, computed)| *computed).count(), 1);
    assert_eq!(cache.in_flight_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_keys_compute_in_parallel() {
    // Every compute waits on a shared barrier, so this only finishes if all
    // of them are running at the same time.
    const KEYS: usize = 8;
    let cache = new_cache();
    let barrier = Arc::new(Barrier::new(KEYS));

    let tasks: Vec<_> = (0..KEYS)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                cache
                    .get_or_compute(&format!("key-{i}"), || async move {
                        barrier.wait().await;
                        Ok::<_, SaucierError>(format!("value-{i}"))
                    })
                    .await
            })
        })
        .collect();

    let results = tokio::time::timeout(Duration::from_secs(5), join_all(tasks))
        .await
        .expect("distinct keys were serialized");

    for (i, joined) in results.into_iter().enumerate() {
        let (value, computed) = joined.unwrap().unwrap();
        assert_eq!(value, format!("value-{i}"));
        assert!(computed);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lock_count_returns_to_zero() {
    let cache = new_cache();

    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_compute(&format!("key-{i}"), || async move {
                        tokio::task::yield_now().await;
                        Ok::<_, SaucierError>(i.to_string())
                    })
                    .await
            })
        })
        .collect();

    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    assert_eq!(cache.in_flight_keys(), 0);
    cache.run_pending_tasks().await;
    assert_eq!(cache.entry_count(), 100);
}

#[tokio::test]
async fn lock_is_live_only_during_computation() {
    let cache = new_cache();
    let release = Arc::new(Notify::new());

    let task = {
        let cache = Arc::clone(&cache);
        let release = Arc::clone(&release);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async move {
                    release.notified().await;
                    Ok::<_, SaucierError>("v".to_string())
                })
                .await
        })
    };

    wait_until(|| cache.in_flight_keys() == 1).await;
    release.notify_one();
    let (_, computed) = task.await.unwrap().unwrap();
    assert!(computed);
    assert_eq!(cache.in_flight_keys(), 0);
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn failures_are_not_cached() {
    let cache = new_cache();

    let result = cache
        .get_or_compute("k", || async {
            Err::<String, _>(SaucierError::Upstream("boom".into()))
        })
        .await;
    assert!(matches!(result, Err(SaucierError::Upstream(_))));
    assert!(cache.get("k").await.is_none());
    assert_eq!(cache.in_flight_keys(), 0);

    // Next caller computes afresh.
    let (value, computed) = cache
        .get_or_compute("k", || async { Ok::<_, SaucierError>("ok".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "ok");
    assert!(computed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiter_behind_failed_computation_computes_itself() {
    let cache = new_cache();

    let failing = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Err::<String, _>(SaucierError::Timeout {
                        after: Duration::from_millis(100),
                    })
                })
                .await
        })
    };
    wait_until(|| cache.in_flight_keys() == 1).await;

    let waiter = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async { Ok::<_, SaucierError>("second".to_string()) })
                .await
        })
    };

    assert!(matches!(
        failing.await.unwrap(),
        Err(SaucierError::Timeout { .. })
    ));
    let (value, computed) = waiter.await.unwrap().unwrap();
    assert_eq!(value, "second");
    assert!(computed);
    assert_eq!(cache.in_flight_keys(), 0);
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test]
async fn cancelled_computation_releases_lock() {
    let cache = new_cache();

    let task = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || std::future::pending::<Result<String, SaucierError>>())
                .await
        })
    };
    wait_until(|| cache.in_flight_keys() == 1).await;

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(cache.in_flight_keys(), 0);
    assert!(cache.get("k").await.is_none());
}

#[tokio::test]
async fn cancelled_waiter_keeps_computing_callers_lock() {
    let cache = new_cache();
    let release = Arc::new(Notify::new());

    let computing = {
        let cache = Arc::clone(&cache);
        let release = Arc::clone(&release);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async move {
                    release.notified().await;
                    Ok::<_, SaucierError>("v".to_string())
                })
                .await
        })
    };
    wait_until(|| cache.in_flight_keys() == 1).await;

    let waiter = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async { Ok::<_, SaucierError>("w".to_string()) })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());

    // The computing caller still owns the lock.
    assert_eq!(cache.in_flight_keys(), 1);

    release.notify_one();
    let (value, computed) = computing.await.unwrap().unwrap();
    assert_eq!(value, "v");
    assert!(computed);
    assert_eq!(cache.in_flight_keys(), 0);
}

#[tokio::test]
async fn waiter_takes_over_after_computing_caller_is_cancelled() {
    let cache = new_cache();

    let computing = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || std::future::pending::<Result<String, SaucierError>>())
                .await
        })
    };
    wait_until(|| cache.in_flight_keys() == 1).await;

    let waiter = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_compute("k", || async { Ok::<_, SaucierError>("w".to_string()) })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    computing.abort();
    assert!(computing.await.unwrap_err().is_cancelled());

    let (value, computed) = waiter.await.unwrap().unwrap();
    assert_eq!(value, "w");
    assert!(computed);
    assert_eq!(cache.in_flight_keys(), 0);
}

// =========================================================================
// Eviction
// =========================================================================

#[tokio::test]
async fn entries_expire_after_write() {
    let config = CacheConfig::new().expire_after_write(Duration::from_millis(50));
    let cache = StampedeCache::new(&config);

    cache.put("k", "v".to_string()).await;
    assert!(cache.get("k").await.is_some());

    // Wait for TTL + some margin
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(cache.get("k").await.is_none());

    let (_, computed) = cache
        .get_or_compute("k", || async { Ok::<_, SaucierError>("fresh".to_string()) })
        .await
        .unwrap();
    assert!(computed);
}

#[tokio::test]
async fn size_is_bounded() {
    let config = CacheConfig::new().maximum_size(10);
    let cache = StampedeCache::new(&config);

    for i in 0..100 {
        cache.put(format!("key-{i}"), i.to_string()).await;
    }
    cache.run_pending_tasks().await;

    assert!(cache.entry_count() <= 10);
}

#[tokio::test]
async fn invalidated_entry_is_recomputed() {
    let cache = new_cache();
    cache.put("k", "old".to_string()).await;
    cache.invalidate("k").await;

    let (value, computed) = cache
        .get_or_compute("k", || async { Ok::<_, SaucierError>("new".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "new");
    assert!(computed);
}

#[tokio::test]
async fn clear_drops_everything() {
    let cache = new_cache();
    cache.put("a", "1".to_string()).await;
    cache.put("b", "2".to_string()).await;
    cache.clear();

    assert!(cache.get("a").await.is_none());
    assert!(cache.get("b").await.is_none());
}
