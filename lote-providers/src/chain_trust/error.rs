//! Enumerates errors related to chain-trust evaluation.

use thiserror::Error;

use crate::anchor_source::error::AnchorSourceError;
use crate::verification::VerificationContext;

#[derive(Debug, Error, PartialEq)]
pub enum EvaluatorError {
    /// A purpose that is configured yielded no anchors: a deployment
    /// error, distinct from an unsupported purpose.
    #[error("anchor source for `{0}` is configured but yielded no anchors")]
    MisconfiguredSource(VerificationContext),
    #[error("anchor source error: `{0}`")]
    AnchorSource(#[from] AnchorSourceError),
}
