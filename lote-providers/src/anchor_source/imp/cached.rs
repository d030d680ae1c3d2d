use std::hash::Hash;
use std::sync::Arc;

use crate::anchor_source::{error::AnchorSourceError, AnchorSource};
use crate::caching::{CacheParams, CacheParamsError, CacheSupplier, SingleFlightCache};
use crate::common_models::non_empty::NonEmpty;

/// Memoizes an anchor source per query with single-flight, time-to-live
/// and least-recently-used semantics.
///
/// "No anchors through this source" is a cacheable answer; failed lookups
/// are not cached and the next query retries the inner source.
pub struct CachedSource<Q, A> {
    cache: SingleFlightCache<Q, Option<NonEmpty<A>>, AnchorSourceError>,
}

struct SourceSupplier<Q, A> {
    inner: Arc<dyn AnchorSource<Q, A>>,
}

#[async_trait::async_trait]
impl<Q, A> CacheSupplier<Q, Option<NonEmpty<A>>, AnchorSourceError> for SourceSupplier<Q, A>
where
    Q: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    async fn supply(&self, key: Q) -> Result<Option<NonEmpty<A>>, AnchorSourceError> {
        self.inner.get(&key).await
    }
}

impl<Q, A> CachedSource<Q, A>
where
    Q: Clone + Eq + Hash + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    pub fn new(
        inner: Arc<dyn AnchorSource<Q, A>>,
        params: CacheParams,
    ) -> Result<Self, CacheParamsError> {
        Ok(Self {
            cache: SingleFlightCache::new(params, Arc::new(SourceSupplier { inner }))?,
        })
    }
}

#[async_trait::async_trait]
impl<Q, A> AnchorSource<Q, A> for CachedSource<Q, A>
where
    Q: Clone + Eq + Hash + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    async fn get(&self, query: &Q) -> Result<Option<NonEmpty<A>>, AnchorSourceError> {
        self.cache.get(query.clone()).await
    }
}
