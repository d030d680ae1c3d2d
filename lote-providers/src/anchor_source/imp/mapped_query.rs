use std::sync::Arc;

use crate::anchor_source::{error::AnchorSourceError, AnchorSource};
use crate::common_models::non_empty::NonEmpty;

/// Adapts a source to queries in a different representation.
pub struct MappedQuerySource<Q2, Q, A> {
    mapper: Box<dyn Fn(&Q2) -> Q + Send + Sync>,
    inner: Arc<dyn AnchorSource<Q, A>>,
}

impl<Q2, Q, A> MappedQuerySource<Q2, Q, A> {
    pub fn new(
        mapper: impl Fn(&Q2) -> Q + Send + Sync + 'static,
        inner: Arc<dyn AnchorSource<Q, A>>,
    ) -> Self {
        Self {
            mapper: Box::new(mapper),
            inner,
        }
    }
}

#[async_trait::async_trait]
impl<Q2, Q, A> AnchorSource<Q2, A> for MappedQuerySource<Q2, Q, A>
where
    Q2: Send + Sync,
    Q: Send + Sync,
    A: Send + Sync,
{
    async fn get(&self, query: &Q2) -> Result<Option<NonEmpty<A>>, AnchorSourceError> {
        let mapped = (self.mapper)(query);
        self.inner.get(&mapped).await
    }
}
