use std::collections::HashMap;
use std::hash::Hash;

use crate::anchor_source::{error::AnchorSourceError, AnchorSource};
use crate::common_models::non_empty::NonEmpty;

/// A source answering from a fixed map of anchors.
pub struct StaticSource<Q, A> {
    anchors: HashMap<Q, NonEmpty<A>>,
}

impl<Q: Eq + Hash, A> StaticSource<Q, A> {
    pub fn new(anchors: HashMap<Q, NonEmpty<A>>) -> Self {
        Self { anchors }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Q, NonEmpty<A>)>) -> Self {
        Self {
            anchors: entries.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl<Q, A> AnchorSource<Q, A> for StaticSource<Q, A>
where
    Q: Eq + Hash + Send + Sync,
    A: Clone + Send + Sync,
{
    async fn get(&self, query: &Q) -> Result<Option<NonEmpty<A>>, AnchorSourceError> {
        Ok(self.anchors.get(query).cloned())
    }
}
