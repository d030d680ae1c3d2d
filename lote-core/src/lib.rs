//! The **LoTE Core** is a library for anchoring certificate chains of an
//! identity wallet ecosystem in published Lists of Trusted Entities
//! (LoTEs).
//!
//! A wallet deployment publishes, per list profile, a signed list of the
//! entities trusted to issue or revoke a class of attestations. Lists may
//! point to further lists. This library loads those lists with bounded
//! recursion, projects them into per-purpose trust anchor sets, caches
//! the projections, and evaluates certificate chains against them with an
//! injected chain validator.
//!
//! ## Key features:
//!
//! - Recursive trusted-list loading with depth, count and cycle bounds,
//!   sibling parallelism, and progress streamed as events
//! - Per-purpose trust anchor projection over a closed set of
//!   verification purposes
//! - Single-flight, TTL- and LRU-bounded caching of anchor lookups
//! - Chain-trust evaluation with opt-in recovery anchors
//! - Attestation classification from mdoc doctypes and sd-jwt-vc vcts
//!
//! ## Usage
//!
//! The library consists of two crates: the **Core** and the **Providers**.
//!
//! ### Core
//!
//! The **Core** provides a developer API wiring the providers together
//! with sensible defaults. Construct a [`LoteCore`] from a
//! [`config::LoteCoreConfig`] naming the list endpoint per profile and an
//! injected chain validator, then use the [`service::trust_service::TrustService`]
//! to resolve anchors and evaluate chains.
//!
//! ### Providers
//!
//! For extending the library, the **Providers** crate exposes the traits
//! and implementations separately: document fetchers, anchor sources and
//! their combinators, the recursive loader, and the chain-trust
//! evaluator. Deployments with unusual transports or validation rules
//! compose these directly.
//!
//! The core performs no cryptography of its own: trusted-list signature
//! verification and PKIX path validation stay behind the injected
//! collaborators.

use std::sync::Arc;

use lote_providers::chain_trust::ValidateCertificateChain;
use lote_providers::trusted_list::fetcher::imp::http::HttpDocumentFetcher;
use lote_providers::trusted_list::fetcher::DocumentFetcher;
use lote_providers::trusted_list::model::CertificateObject;

use config::LoteCoreConfig;
use model::CertificateChain;
use service::error::TrustServiceError;
use service::trust_service::TrustService;

pub mod config;
pub mod model;
pub mod service;

pub struct LoteCore {
    pub trust_service: TrustService,
}

impl LoteCore {
    /// Wires the service layer over an HTTP document fetcher.
    pub fn new(
        config: Option<LoteCoreConfig>,
        validator: Arc<dyn ValidateCertificateChain<CertificateChain, CertificateObject>>,
    ) -> Result<Self, TrustServiceError> {
        Self::with_fetcher(config, Arc::new(HttpDocumentFetcher::default()), validator)
    }

    /// Wires the service layer over a caller-provided document fetcher.
    pub fn with_fetcher(
        config: Option<LoteCoreConfig>,
        fetcher: Arc<dyn DocumentFetcher>,
        validator: Arc<dyn ValidateCertificateChain<CertificateChain, CertificateObject>>,
    ) -> Result<Self, TrustServiceError> {
        let config = config.unwrap_or_default();

        let trust_service = TrustService::new(&config, fetcher, validator)?;

        Ok(Self { trust_service })
    }
}
