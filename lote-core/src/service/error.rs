//! Enumerates errors for services.

use lote_providers::anchor_source::error::AnchorSourceError;
use lote_providers::anchor_source::router::RouterError;
use lote_providers::caching::CacheParamsError;
use lote_providers::chain_trust::error::EvaluatorError;
use lote_providers::trusted_list::loader::LoaderParamsError;
use lote_providers::verification::ListProfile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustServiceError {
    #[error("no trusted list endpoints configured")]
    NoListEndpoints,
    #[error("no trusted list endpoint configured for profile `{0:?}`")]
    UnknownProfile(ListProfile),
    #[error("loader params error: `{0}`")]
    LoaderParams(#[from] LoaderParamsError),
    #[error("cache params error: `{0}`")]
    CacheParams(#[from] CacheParamsError),
    #[error("router error: `{0}`")]
    Router(#[from] RouterError),
    #[error("anchor source error: `{0}`")]
    AnchorSource(#[from] AnchorSourceError),
    #[error("evaluator error: `{0}`")]
    Evaluator(#[from] EvaluatorError),
}
