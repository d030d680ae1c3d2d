//! Routing queries to the anchor source responsible for them.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use thiserror::Error;

use crate::anchor_source::{
    error::AnchorSourceError, imp::mapped_query::MappedQuerySource, AnchorSource,
};
use crate::common_models::non_empty::NonEmpty;

/// The answer for one routed query.
///
/// `MisconfiguredSource` and `NotSupported` are deliberately distinct:
/// the first means a query this router claims to serve yielded no anchors
/// (a deployment error), the second that the caller asked for something
/// outside the supported sets.
#[derive(Debug, PartialEq)]
pub enum QueryOutcome<A> {
    Found(NonEmpty<A>),
    MisconfiguredSource,
    NotSupported,
}

#[derive(Debug, Error, PartialEq)]
pub enum RouterError {
    #[error("supported query set must not be empty")]
    EmptySupportedSet,
    #[error("supported query sets overlap")]
    OverlappingQueries,
    #[error("query transform must keep supported sets distinct")]
    NonInjectiveTransform,
}

struct Route<Q, A> {
    queries: HashSet<Q>,
    source: Arc<dyn AnchorSource<Q, A>>,
}

/// An immutable mapping from disjoint query sets to the anchor sources
/// serving them.
pub struct SupportedQueries<Q, A> {
    routes: Vec<Route<Q, A>>,
}

impl<Q, A> SupportedQueries<Q, A>
where
    Q: Eq + Hash + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    pub fn new(
        queries: HashSet<Q>,
        source: Arc<dyn AnchorSource<Q, A>>,
    ) -> Result<Self, RouterError> {
        if queries.is_empty() {
            return Err(RouterError::EmptySupportedSet);
        }

        Ok(Self {
            routes: vec![Route { queries, source }],
        })
    }

    pub fn supports(&self, query: &Q) -> bool {
        self.routes.iter().any(|route| route.queries.contains(query))
    }

    pub fn supported_queries(&self) -> impl Iterator<Item = &Q> {
        self.routes.iter().flat_map(|route| route.queries.iter())
    }

    pub async fn get(&self, query: &Q) -> Result<QueryOutcome<A>, AnchorSourceError> {
        let Some(route) = self
            .routes
            .iter()
            .find(|route| route.queries.contains(query))
        else {
            return Ok(QueryOutcome::NotSupported);
        };

        match route.source.get(query).await? {
            Some(anchors) => Ok(QueryOutcome::Found(anchors)),
            None => Ok(QueryOutcome::MisconfiguredSource),
        }
    }

    /// Disjoint union of two routers; fails when any query is claimed by
    /// both sides.
    pub fn try_merge(mut self, other: Self) -> Result<Self, RouterError> {
        let overlapping = other.routes.iter().any(|incoming| {
            incoming
                .queries
                .iter()
                .any(|query| self.supports(query))
        });
        if overlapping {
            return Err(RouterError::OverlappingQueries);
        }

        self.routes.extend(other.routes);
        Ok(self)
    }

    /// Re-keys the router to another query type.
    ///
    /// `into` maps each supported query outward, `from` maps incoming
    /// queries back to the original type for the wrapped sources. `into`
    /// must be injective on every supported set; a collapsed set or an
    /// overlap introduced between sets fails the transform.
    pub fn transform<Q2>(
        self,
        into: impl Fn(&Q) -> Q2,
        from: impl Fn(&Q2) -> Q + Clone + Send + Sync + 'static,
    ) -> Result<SupportedQueries<Q2, A>, RouterError>
    where
        Q2: Eq + Hash + Send + Sync + 'static,
    {
        let mut transformed: SupportedQueries<Q2, A> = SupportedQueries { routes: vec![] };

        for route in self.routes {
            let queries: HashSet<Q2> = route.queries.iter().map(&into).collect();
            if queries.len() != route.queries.len() {
                return Err(RouterError::NonInjectiveTransform);
            }
            if queries.iter().any(|query| transformed.supports(query)) {
                return Err(RouterError::NonInjectiveTransform);
            }

            let source = Arc::new(MappedQuerySource::new(from.clone(), route.source));
            transformed.routes.push(Route { queries, source });
        }

        Ok(transformed)
    }
}
