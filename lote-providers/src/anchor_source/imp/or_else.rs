use std::sync::Arc;

use crate::anchor_source::{error::AnchorSourceError, AnchorSource};
use crate::common_models::non_empty::NonEmpty;

/// Falls back to a secondary source when the primary has no anchors for
/// the query. Errors of the primary are propagated, not recovered.
pub struct OrElseSource<Q, A> {
    primary: Arc<dyn AnchorSource<Q, A>>,
    secondary: Arc<dyn AnchorSource<Q, A>>,
}

impl<Q, A> OrElseSource<Q, A> {
    pub fn new(primary: Arc<dyn AnchorSource<Q, A>>, secondary: Arc<dyn AnchorSource<Q, A>>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl<Q, A> AnchorSource<Q, A> for OrElseSource<Q, A>
where
    Q: Send + Sync,
    A: Send + Sync,
{
    async fn get(&self, query: &Q) -> Result<Option<NonEmpty<A>>, AnchorSourceError> {
        match self.primary.get(query).await? {
            Some(anchors) => Ok(Some(anchors)),
            None => self.secondary.get(query).await,
        }
    }
}
