//! Evaluating certificate chains against purpose-scoped trust anchors.
//!
//! The evaluator combines an injected chain validator with one nullary
//! anchor source per verification purpose. It answers with the
//! validator's verdict, `None` for purposes it is not configured for, and
//! a loud error when a configured purpose turns out to have no anchors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::anchor_source::AnchorSource;
use crate::common_models::non_empty::NonEmpty;
use crate::verification::VerificationContext;

pub mod error;
pub mod model;

#[cfg(test)]
mod test;

use error::EvaluatorError;
use model::{ChainValidation, ValidationFailure};

/// The injected chain validator.
///
/// Implementations decide PKIX semantics and must catch their own
/// failures: a broken validation is a [`ChainValidation::NotTrusted`]
/// with a cause, never a panic or error.
#[async_trait::async_trait]
pub trait ValidateCertificateChain<C, A>: Send + Sync {
    async fn validate(&self, chain: &C, anchors: &NonEmpty<A>) -> ChainValidation<A>;
}

/// Yields an alternative anchor source to retry with after a negative
/// verdict, or `None` to let the verdict stand.
pub trait RecoveryStrategy<A>: Send + Sync {
    fn recover(&self, failure: &ValidationFailure) -> Option<Arc<dyn AnchorSource<(), A>>>;
}

pub struct ChainTrustEvaluator<C, A> {
    validator: Arc<dyn ValidateCertificateChain<C, A>>,
    anchors_by_purpose: HashMap<VerificationContext, Arc<dyn AnchorSource<(), A>>>,
    recovery: HashMap<VerificationContext, Arc<dyn RecoveryStrategy<A>>>,
}

impl<C, A> Clone for ChainTrustEvaluator<C, A> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            anchors_by_purpose: self.anchors_by_purpose.clone(),
            recovery: self.recovery.clone(),
        }
    }
}

impl<C, A> ChainTrustEvaluator<C, A>
where
    C: Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    pub fn new(
        validator: Arc<dyn ValidateCertificateChain<C, A>>,
        anchors_by_purpose: HashMap<VerificationContext, Arc<dyn AnchorSource<(), A>>>,
    ) -> Self {
        Self {
            validator,
            anchors_by_purpose,
            recovery: HashMap::new(),
        }
    }

    pub fn with_recovery(
        mut self,
        purpose: VerificationContext,
        strategy: Arc<dyn RecoveryStrategy<A>>,
    ) -> Self {
        self.recovery.insert(purpose, strategy);
        self
    }

    pub fn supports(&self, purpose: &VerificationContext) -> bool {
        self.anchors_by_purpose.contains_key(purpose)
    }

    /// Validates `chain` against the anchors configured for `purpose`.
    ///
    /// `Ok(None)` when no anchor source is configured for the purpose. A
    /// negative verdict triggers the purpose's recovery strategy at most
    /// once; when the retry is negative too, the original cause wins.
    pub async fn evaluate(
        &self,
        chain: &C,
        purpose: &VerificationContext,
    ) -> Result<Option<ChainValidation<A>>, EvaluatorError> {
        let Some(source) = self.anchors_by_purpose.get(purpose) else {
            return Ok(None);
        };

        let anchors = source
            .get(&())
            .await?
            .ok_or_else(|| EvaluatorError::MisconfiguredSource(purpose.clone()))?;

        let verdict = self.validator.validate(chain, &anchors).await;

        let ChainValidation::NotTrusted(failure) = &verdict else {
            return Ok(Some(verdict));
        };
        let Some(strategy) = self.recovery.get(purpose) else {
            return Ok(Some(verdict));
        };
        let Some(alternative) = strategy.recover(failure) else {
            return Ok(Some(verdict));
        };
        let Some(anchors) = alternative.get(&()).await? else {
            return Ok(Some(verdict));
        };

        tracing::debug!(%purpose, "retrying chain validation against recovery anchors");
        match self.validator.validate(chain, &anchors).await {
            ChainValidation::Trusted(anchor) => Ok(Some(ChainValidation::Trusted(anchor))),
            ChainValidation::NotTrusted(_) => Ok(Some(verdict)),
        }
    }

    /// Merges two evaluators' purpose maps.
    ///
    /// Right-biased: on purposes configured in both, `other`'s anchor
    /// source and recovery win. The merged evaluator keeps `self`'s
    /// validator.
    pub fn merge(mut self, other: Self) -> Self {
        self.anchors_by_purpose.extend(other.anchors_by_purpose);
        self.recovery.extend(other.recovery);
        self
    }

    /// Adapts the evaluator to chains in a different representation.
    pub fn contra_map_chain<C2>(
        self,
        adapt: impl Fn(&C2) -> C + Send + Sync + 'static,
    ) -> ChainTrustEvaluator<C2, A>
    where
        C2: Send + Sync + 'static,
    {
        ChainTrustEvaluator {
            validator: Arc::new(AdaptedValidator {
                adapt: Box::new(adapt),
                inner: self.validator,
            }),
            anchors_by_purpose: self.anchors_by_purpose,
            recovery: self.recovery,
        }
    }
}

struct AdaptedValidator<C2, C, A> {
    adapt: Box<dyn Fn(&C2) -> C + Send + Sync>,
    inner: Arc<dyn ValidateCertificateChain<C, A>>,
}

#[async_trait::async_trait]
impl<C2, C, A> ValidateCertificateChain<C2, A> for AdaptedValidator<C2, C, A>
where
    C2: Send + Sync + 'static,
    C: Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    async fn validate(&self, chain: &C2, anchors: &NonEmpty<A>) -> ChainValidation<A> {
        let adapted = (self.adapt)(chain);
        self.inner.validate(&adapted, anchors).await
    }
}
