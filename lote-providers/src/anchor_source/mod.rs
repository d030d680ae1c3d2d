//! Querying trust anchors and composing anchor sources.

pub mod error;
pub mod imp;
pub mod router;

use crate::common_models::non_empty::NonEmpty;

use error::AnchorSourceError;

/// An asynchronous lookup from a query to the trust anchors answering it.
///
/// `Ok(None)` means the query has no anchors through this source (the
/// source is not configured for it), never an empty anchor set; a
/// successful lookup always carries at least one anchor.
#[async_trait::async_trait]
pub trait AnchorSource<Q, A>: Send + Sync {
    async fn get(&self, query: &Q) -> Result<Option<NonEmpty<A>>, AnchorSourceError>;
}
