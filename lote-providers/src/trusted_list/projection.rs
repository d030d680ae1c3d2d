//! Projecting trust anchors out of loaded trusted lists.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::anchor_source::{
    error::AnchorSourceError,
    router::{RouterError, SupportedQueries},
    AnchorSource,
};
use crate::common_models::non_empty::NonEmpty;
use crate::trusted_list::loader::{LoadProblem, TrustedListLoader};
use crate::trusted_list::model::{CertificateObject, TrustedEntityList};
use crate::verification::{ListProfile, ServiceTypeId, VerificationContext};

/// All certificates of all services carrying `service_type`, across every
/// entity, in declaration order and with duplicates preserved. `None` iff
/// no matching service carries a certificate.
pub fn anchors_with_service_type(
    list: &TrustedEntityList,
    service_type: &ServiceTypeId,
) -> Option<NonEmpty<CertificateObject>> {
    let certificates: Vec<CertificateObject> = list
        .entities
        .iter()
        .flat_map(|entity| entity.services.iter())
        .filter(|service| service.information.type_identifier == *service_type)
        .flat_map(|service| {
            service
                .information
                .digital_identity
                .iter()
                .flat_map(|identity| identity.x509_certificates.iter())
        })
        .cloned()
        .collect();

    NonEmpty::from_vec(certificates)
}

fn profile_service_types(profile: &ListProfile) -> HashMap<VerificationContext, ServiceTypeId> {
    profile
        .purposes()
        .into_iter()
        .filter_map(|purpose| {
            let service_type = purpose.service_type()?;
            Some((purpose, service_type))
        })
        .collect()
}

/// An anchor source over one already-loaded list.
pub struct ListAnchorSource {
    list: Arc<TrustedEntityList>,
    service_types: HashMap<VerificationContext, ServiceTypeId>,
}

impl ListAnchorSource {
    pub fn new(
        list: Arc<TrustedEntityList>,
        service_types: HashMap<VerificationContext, ServiceTypeId>,
    ) -> Self {
        Self {
            list,
            service_types,
        }
    }

    /// Restricted to the purposes `profile` serves, mapped through the
    /// default service-type table.
    pub fn for_profile(list: Arc<TrustedEntityList>, profile: &ListProfile) -> Self {
        Self::new(list, profile_service_types(profile))
    }
}

#[async_trait::async_trait]
impl AnchorSource<VerificationContext, CertificateObject> for ListAnchorSource {
    async fn get(
        &self,
        query: &VerificationContext,
    ) -> Result<Option<NonEmpty<CertificateObject>>, AnchorSourceError> {
        Ok(self
            .service_types
            .get(query)
            .and_then(|service_type| anchors_with_service_type(&self.list, service_type)))
    }
}

/// Builds a router over per-profile lists: one disjoint route per present
/// profile, each serving that profile's closed purpose set.
pub fn router_from_lists(
    lists: HashMap<ListProfile, Arc<TrustedEntityList>>,
) -> Result<SupportedQueries<VerificationContext, CertificateObject>, RouterError> {
    let mut router: Option<SupportedQueries<VerificationContext, CertificateObject>> = None;

    for (profile, list) in lists {
        let purposes: HashSet<VerificationContext> = profile.purposes().into_iter().collect();
        let source = Arc::new(ListAnchorSource::for_profile(list, &profile));
        let route = SupportedQueries::new(purposes, source)?;

        router = Some(match router {
            None => route,
            Some(existing) => existing.try_merge(route)?,
        });
    }

    router.ok_or(RouterError::EmptySupportedSet)
}

/// Loads a trusted list on demand and projects anchors from it.
///
/// Every lookup runs a full bounded traversal of the configured list and
/// the lists it points to, projecting the queried purpose's service type
/// across all of them in event order. Wrap it in
/// [`crate::anchor_source::imp::cached::CachedSource`] so repeated
/// lookups reuse one traversal.
pub struct RemoteListSource {
    loader: Arc<TrustedListLoader>,
    url: String,
    service_types: HashMap<VerificationContext, ServiceTypeId>,
    list_filter: Option<Arc<dyn Fn(&TrustedEntityList) -> bool + Send + Sync>>,
}

impl RemoteListSource {
    pub fn new(
        loader: Arc<TrustedListLoader>,
        url: impl Into<String>,
        service_types: HashMap<VerificationContext, ServiceTypeId>,
    ) -> Self {
        Self {
            loader,
            url: url.into(),
            service_types,
            list_filter: None,
        }
    }

    pub fn for_profile(
        loader: Arc<TrustedListLoader>,
        url: impl Into<String>,
        profile: &ListProfile,
    ) -> Self {
        Self::new(loader, url, profile_service_types(profile))
    }

    /// Only lists accepted by `filter` contribute anchors; the profile
    /// conformance predicate is injected, not decided here.
    pub fn with_list_filter(
        mut self,
        filter: impl Fn(&TrustedEntityList) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.list_filter = Some(Arc::new(filter));
        self
    }

    fn accepts(&self, list: &TrustedEntityList) -> bool {
        self.list_filter
            .as_ref()
            .map(|filter| filter(list))
            .unwrap_or(true)
    }
}

#[async_trait::async_trait]
impl AnchorSource<VerificationContext, CertificateObject> for RemoteListSource {
    async fn get(
        &self,
        query: &VerificationContext,
    ) -> Result<Option<NonEmpty<CertificateObject>>, AnchorSourceError> {
        let Some(service_type) = self.service_types.get(query) else {
            return Ok(None);
        };

        let outcome = self.loader.load_collected(&self.url).await;
        let Some(primary) = outcome.primary else {
            let cause = outcome.problems.into_iter().find_map(|problem| match problem {
                LoadProblem::Fetch { cause, .. } => Some(cause),
                _ => None,
            });
            return Err(match cause {
                Some(cause) => AnchorSourceError::Fetch(cause),
                None => AnchorSourceError::Lookup(format!(
                    "no trusted list available at `{}`",
                    self.url
                )),
            });
        };

        let mut certificates = vec![];
        let lists =
            std::iter::once(&primary).chain(outcome.referenced.iter().map(|entry| &entry.list));
        for list in lists {
            if !self.accepts(list) {
                continue;
            }
            if let Some(anchors) = anchors_with_service_type(list, service_type) {
                certificates.extend(anchors);
            }
        }

        Ok(NonEmpty::from_vec(certificates))
    }
}

#[cfg(test)]
mod test;
