use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("supplier failed for `{0}`")]
struct TestError(String);

struct CountingSupplier {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingSupplier {
    fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CacheSupplier<String, String, TestError> for CountingSupplier {
    async fn supply(&self, key: String) -> Result<String, TestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(format!("value-{key}"))
    }
}

struct FlakySupplier {
    calls: AtomicUsize,
    failures: usize,
}

impl FlakySupplier {
    fn failing_first(failures: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
        }
    }
}

#[async_trait::async_trait]
impl CacheSupplier<String, String, TestError> for FlakySupplier {
    async fn supply(&self, key: String) -> Result<String, TestError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        // yield so that concurrent lookups overlap with the computation
        tokio::time::sleep(Duration::from_millis(10)).await;
        if call < self.failures {
            Err(TestError(key))
        } else {
            Ok(format!("value-{key}"))
        }
    }
}

fn params(ttl_secs: u64, capacity: usize) -> CacheParams {
    CacheParams {
        ttl: Duration::from_secs(ttl_secs),
        capacity,
    }
}

#[test]
fn test_new_rejects_invalid_params() {
    let supplier = Arc::new(CountingSupplier::new(Duration::ZERO));

    assert_eq!(
        SingleFlightCache::new(params(60, 0), supplier.clone())
            .err()
            .unwrap(),
        CacheParamsError::ZeroCapacity
    );
    assert_eq!(
        SingleFlightCache::new(params(0, 4), supplier).err().unwrap(),
        CacheParamsError::ZeroTtl
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_lookups_share_one_supplier_invocation() {
    let supplier = Arc::new(CountingSupplier::new(Duration::from_millis(50)));
    let cache = SingleFlightCache::new(params(60, 8), supplier.clone()).unwrap();

    let results = join_all((0..100).map(|_| cache.get("x".to_string()))).await;

    assert_eq!(supplier.calls(), 1);
    for result in results {
        assert_eq!(result.unwrap(), "value-x");
    }
}

#[tokio::test(start_paused = true)]
async fn test_fresh_entry_is_served_without_refetch() {
    let supplier = Arc::new(CountingSupplier::new(Duration::ZERO));
    let cache = SingleFlightCache::new(params(60, 8), supplier.clone()).unwrap();

    cache.get("x".to_string()).await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    cache.get("x".to_string()).await.unwrap();

    assert_eq!(supplier.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let supplier = Arc::new(CountingSupplier::new(Duration::ZERO));
    let cache = SingleFlightCache::new(params(60, 8), supplier.clone()).unwrap();

    cache.get("x".to_string()).await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    cache.get("x".to_string()).await.unwrap();

    assert_eq!(supplier.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_least_recently_accessed_entry_is_evicted() {
    let supplier = Arc::new(CountingSupplier::new(Duration::ZERO));
    let cache = SingleFlightCache::new(params(600, 2), supplier.clone()).unwrap();

    cache.get("a".to_string()).await.unwrap();
    cache.get("b".to_string()).await.unwrap();
    // access, not insertion, decides recency: touch "a" so "b" is oldest
    cache.get("a".to_string()).await.unwrap();
    cache.get("c".to_string()).await.unwrap();
    assert_eq!(supplier.calls(), 3);

    // "a" survived the eviction, "b" did not
    cache.get("a".to_string()).await.unwrap();
    assert_eq!(supplier.calls(), 3);
    cache.get("b".to_string()).await.unwrap();
    assert_eq!(supplier.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_failed_computation_is_evicted_before_waiters_observe_it() {
    let supplier = Arc::new(FlakySupplier::failing_first(1));
    let cache = SingleFlightCache::new(params(60, 8), supplier).unwrap();

    let (first, second) = tokio::join!(cache.get("x".to_string()), cache.get("x".to_string()));

    // both coalesced waiters receive the same error
    assert_eq!(first.unwrap_err(), TestError("x".to_string()));
    assert_eq!(second.unwrap_err(), TestError("x".to_string()));

    // the error was not cached
    assert_eq!(cache.get("x".to_string()).await.unwrap(), "value-x");
}

#[tokio::test(start_paused = true)]
async fn test_distinct_keys_do_not_coalesce() {
    let supplier = Arc::new(CountingSupplier::new(Duration::from_millis(10)));
    let cache = SingleFlightCache::new(params(60, 8), supplier.clone()).unwrap();

    let (a, b) = tokio::join!(cache.get("a".to_string()), cache.get("b".to_string()));

    assert_eq!(a.unwrap(), "value-a");
    assert_eq!(b.unwrap(), "value-b");
    assert_eq!(supplier.calls(), 2);
}
