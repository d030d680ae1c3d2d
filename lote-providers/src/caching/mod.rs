//! Single-flight caching for suspendable lookups.
//!
//! Concurrent lookups for the same key share one in-flight computation.
//! A completed result is reused until its time-to-live elapses, it is
//! discarded by the least-recently-used bound, or the computation fails.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[cfg(test)]
mod test;

#[async_trait::async_trait]
pub trait CacheSupplier<K, V, E>: Send + Sync {
    async fn supply(&self, key: K) -> Result<V, E>;
}

#[derive(Clone, Copy, Debug)]
pub struct CacheParams {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            capacity: 32,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CacheParamsError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
    #[error("cache time-to-live must be greater than zero")]
    ZeroTtl,
}

type FlightTask<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    InFlight {
        task: FlightTask<V, E>,
        generation: u64,
    },
    Ready {
        value: V,
        stored_at: Instant,
    },
}

struct CacheState<K, V, E> {
    entries: HashMap<K, Slot<V, E>>,
    // least recently used at the front
    recency: Vec<K>,
    next_generation: u64,
}

impl<K: Clone + Eq + Hash, V, E> CacheState<K, V, E> {
    fn touch(&mut self, key: &K) {
        if let Some(position) = self.recency.iter().position(|candidate| candidate == key) {
            self.recency.remove(position);
        }
        self.recency.push(key.clone());
    }

    fn forget(&mut self, key: &K) {
        if let Some(position) = self.recency.iter().position(|candidate| candidate == key) {
            self.recency.remove(position);
        }
    }

    fn evict_to_capacity(&mut self, capacity: usize) {
        while self.entries.len() > capacity && !self.recency.is_empty() {
            let oldest = self.recency.remove(0);
            self.entries.remove(&oldest);
            tracing::debug!("evicted least recently used cache entry");
        }
    }
}

/// A bounded, expiring map from keys to supplier results.
///
/// The supplier runs outside the state lock, so lookups for distinct keys
/// proceed in parallel while lookups for the same key coalesce onto one
/// shared computation. A failed computation is removed before its error
/// reaches any waiter, so the next lookup retries the supplier.
pub struct SingleFlightCache<K, V, E> {
    supplier: Arc<dyn CacheSupplier<K, V, E>>,
    ttl: Duration,
    capacity: usize,
    state: Arc<Mutex<CacheState<K, V, E>>>,
}

enum Lookup<V, E> {
    Hit(V),
    Join(FlightTask<V, E>),
    Miss,
}

impl<K, V, E> SingleFlightCache<K, V, E>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(
        params: CacheParams,
        supplier: Arc<dyn CacheSupplier<K, V, E>>,
    ) -> Result<Self, CacheParamsError> {
        if params.capacity == 0 {
            return Err(CacheParamsError::ZeroCapacity);
        }
        if params.ttl.is_zero() {
            return Err(CacheParamsError::ZeroTtl);
        }

        Ok(Self {
            supplier,
            ttl: params.ttl,
            capacity: params.capacity,
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                recency: vec![],
                next_generation: 0,
            })),
        })
    }

    /// Returns the supplier's result for `key`, reusing a fresh cached
    /// value or joining an in-flight computation where possible.
    ///
    /// A computation abandoned by every waiter is left suspended rather
    /// than cancelled; the next lookup for the key resumes it.
    pub async fn get(&self, key: K) -> Result<V, E> {
        let task = {
            let mut state = self.state.lock().await;

            let lookup = match state.entries.get(&key) {
                Some(Slot::Ready { value, stored_at }) if stored_at.elapsed() < self.ttl => {
                    Lookup::Hit(value.clone())
                }
                Some(Slot::InFlight { task, .. }) => Lookup::Join(task.clone()),
                _ => Lookup::Miss,
            };

            match lookup {
                Lookup::Hit(value) => {
                    state.touch(&key);
                    return Ok(value);
                }
                Lookup::Join(task) => {
                    state.touch(&key);
                    task
                }
                Lookup::Miss => {
                    let generation = state.next_generation;
                    state.next_generation += 1;

                    let task = self.launch(key.clone(), generation);
                    state.entries.insert(
                        key.clone(),
                        Slot::InFlight {
                            task: task.clone(),
                            generation,
                        },
                    );
                    state.touch(&key);
                    state.evict_to_capacity(self.capacity);
                    task
                }
            }
        };

        task.await
    }

    fn launch(&self, key: K, generation: u64) -> FlightTask<V, E> {
        let supplier = Arc::clone(&self.supplier);
        let state = Arc::clone(&self.state);

        async move {
            let result = supplier.supply(key.clone()).await;

            let mut state = state.lock().await;
            // another generation may have replaced or evicted this entry
            let current = matches!(
                state.entries.get(&key),
                Some(Slot::InFlight { generation: slot_generation, .. }) if *slot_generation == generation
            );
            if current {
                match &result {
                    Ok(value) => {
                        state.entries.insert(
                            key.clone(),
                            Slot::Ready {
                                value: value.clone(),
                                stored_at: Instant::now(),
                            },
                        );
                    }
                    Err(_) => {
                        state.entries.remove(&key);
                        state.forget(&key);
                    }
                }
            }

            result
        }
        .boxed()
        .shared()
    }
}
