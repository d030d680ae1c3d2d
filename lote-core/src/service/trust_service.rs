//! A service for resolving trust anchors per verification purpose and
//! evaluating certificate chains against them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lote_providers::anchor_source::error::AnchorSourceError;
use lote_providers::anchor_source::imp::cached::CachedSource;
use lote_providers::anchor_source::router::{QueryOutcome, SupportedQueries};
use lote_providers::anchor_source::AnchorSource;
use lote_providers::attestation::{AttestationRules, AttestationTrustDispatcher};
use lote_providers::chain_trust::model::ChainValidation;
use lote_providers::chain_trust::{ChainTrustEvaluator, ValidateCertificateChain};
use lote_providers::common_models::non_empty::NonEmpty;
use lote_providers::trusted_list::fetcher::DocumentFetcher;
use lote_providers::trusted_list::loader::{LoadOutcome, TrustedListLoader};
use lote_providers::trusted_list::model::CertificateObject;
use lote_providers::trusted_list::projection::RemoteListSource;
use lote_providers::verification::{ListProfile, VerificationContext};

use crate::config::{ListEndpoint, LoteCoreConfig};
use crate::model::CertificateChain;
use crate::service::error::TrustServiceError;

pub struct TrustService {
    router: Arc<SupportedQueries<VerificationContext, CertificateObject>>,
    evaluator: ChainTrustEvaluator<CertificateChain, CertificateObject>,
    loader: Arc<TrustedListLoader>,
    endpoints: Vec<ListEndpoint>,
}

impl TrustService {
    pub fn new(
        config: &LoteCoreConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        validator: Arc<dyn ValidateCertificateChain<CertificateChain, CertificateObject>>,
    ) -> Result<Self, TrustServiceError> {
        let loader = Arc::new(TrustedListLoader::new(fetcher, config.loader_config)?);

        let mut router: Option<SupportedQueries<VerificationContext, CertificateObject>> = None;
        for endpoint in &config.list_endpoints {
            let source = RemoteListSource::for_profile(
                Arc::clone(&loader),
                endpoint.url.clone(),
                &endpoint.profile,
            );
            let cached = CachedSource::new(Arc::new(source), config.cache_config)?;

            let purposes: HashSet<VerificationContext> =
                endpoint.profile.purposes().into_iter().collect();
            let route = SupportedQueries::new(purposes, Arc::new(cached))?;

            router = Some(match router {
                None => route,
                Some(existing) => existing.try_merge(route)?,
            });
        }
        let router = Arc::new(router.ok_or(TrustServiceError::NoListEndpoints)?);
        tracing::debug!(
            endpoints = config.list_endpoints.len(),
            "trust service router assembled"
        );

        let mut anchors_by_purpose: HashMap<
            VerificationContext,
            Arc<dyn AnchorSource<(), CertificateObject>>,
        > = HashMap::new();
        for endpoint in &config.list_endpoints {
            for purpose in endpoint.profile.purposes() {
                anchors_by_purpose.insert(
                    purpose.clone(),
                    Arc::new(RouterQuerySource {
                        router: Arc::clone(&router),
                        purpose,
                    }),
                );
            }
        }
        let evaluator = ChainTrustEvaluator::new(validator, anchors_by_purpose);

        Ok(Self {
            router,
            evaluator,
            loader,
            endpoints: config.list_endpoints.clone(),
        })
    }

    /// The trust anchors serving `purpose`, resolved through the cached
    /// per-profile lists.
    pub async fn resolve_anchors(
        &self,
        purpose: &VerificationContext,
    ) -> Result<QueryOutcome<CertificateObject>, TrustServiceError> {
        Ok(self.router.get(purpose).await?)
    }

    /// Validates `chain` for `purpose`; `Ok(None)` when the purpose is
    /// not served by any configured list.
    pub async fn evaluate_chain(
        &self,
        chain: &CertificateChain,
        purpose: &VerificationContext,
    ) -> Result<Option<ChainValidation<CertificateObject>>, TrustServiceError> {
        Ok(self.evaluator.evaluate(chain, purpose).await?)
    }

    /// A dispatcher resolving attestation identifiers to purposes and
    /// evaluating issuer chains through this service's anchor sources.
    pub fn attestation_dispatcher(
        &self,
        rules: AttestationRules,
    ) -> AttestationTrustDispatcher<CertificateChain, CertificateObject> {
        AttestationTrustDispatcher::new(rules, self.evaluator.clone())
    }

    /// Diagnostic load of one configured list, bypassing the cache and
    /// returning the collected traversal events.
    pub async fn load_lists(&self, profile: &ListProfile) -> Result<LoadOutcome, TrustServiceError> {
        let endpoint = self
            .endpoints
            .iter()
            .find(|endpoint| endpoint.profile == *profile)
            .ok_or_else(|| TrustServiceError::UnknownProfile(profile.clone()))?;

        Ok(self.loader.load_collected(&endpoint.url).await)
    }
}

/// Fixes a router query to one purpose, as the nullary source shape the
/// evaluator consumes.
struct RouterQuerySource {
    router: Arc<SupportedQueries<VerificationContext, CertificateObject>>,
    purpose: VerificationContext,
}

#[async_trait::async_trait]
impl AnchorSource<(), CertificateObject> for RouterQuerySource {
    async fn get(
        &self,
        _query: &(),
    ) -> Result<Option<NonEmpty<CertificateObject>>, AnchorSourceError> {
        match self.router.get(&self.purpose).await? {
            QueryOutcome::Found(anchors) => Ok(Some(anchors)),
            // surfaces as a misconfigured source at the evaluator; an
            // unsupported purpose cannot reach here because the purpose
            // map is built from the same endpoints
            QueryOutcome::MisconfiguredSource | QueryOutcome::NotSupported => Ok(None),
        }
    }
}
