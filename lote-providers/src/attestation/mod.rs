//! Resolving attestation identifiers to verification purposes.
//!
//! An attestation presents itself as an mdoc doctype or an sd-jwt-vc vct.
//! Classification rules decide which purpose pair (issuance plus status)
//! governs it; the dispatcher then evaluates the issuer chain under the
//! issuance purpose.

use std::sync::Arc;

use thiserror::Error;

use crate::chain_trust::{error::EvaluatorError, model::ChainValidation, ChainTrustEvaluator};
use crate::verification::VerificationContext;

/// Structural tag of an attestation, used to look up its purposes.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttestationIdentifier {
    Mdoc { doc_type: String },
    SdJwtVc { vct: String },
}

impl AttestationIdentifier {
    pub fn mdoc(doc_type: impl Into<String>) -> Self {
        Self::Mdoc {
            doc_type: doc_type.into(),
        }
    }

    pub fn sd_jwt_vc(vct: impl Into<String>) -> Self {
        Self::SdJwtVc { vct: vct.into() }
    }
}

/// The issuance purpose and its status counterpart for one attestation
/// class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PurposePair {
    pub issuance: VerificationContext,
    pub revocation: VerificationContext,
}

type Predicate = Box<dyn Fn(&AttestationIdentifier) -> bool + Send + Sync>;

#[derive(Debug, Error, PartialEq)]
pub enum AttestationRulesError {
    #[error("EAA use case must not be empty")]
    EmptyUseCase,
}

/// Ordered classification rules: PID first, then Pub-EAA, QEAA, and
/// per-use-case EAA rules in registration order. The first match decides.
#[derive(Default)]
pub struct AttestationRules {
    pid: Vec<Predicate>,
    pub_eaa: Vec<Predicate>,
    qeaa: Vec<Predicate>,
    eaa: Vec<(String, Predicate)>,
}

impl AttestationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pid(
        mut self,
        predicate: impl Fn(&AttestationIdentifier) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.pid.push(Box::new(predicate));
        self
    }

    pub fn pub_eaa(
        mut self,
        predicate: impl Fn(&AttestationIdentifier) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.pub_eaa.push(Box::new(predicate));
        self
    }

    pub fn qeaa(
        mut self,
        predicate: impl Fn(&AttestationIdentifier) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.qeaa.push(Box::new(predicate));
        self
    }

    pub fn eaa(
        mut self,
        use_case: impl Into<String>,
        predicate: impl Fn(&AttestationIdentifier) -> bool + Send + Sync + 'static,
    ) -> Result<Self, AttestationRulesError> {
        let use_case = use_case.into();
        if use_case.is_empty() {
            return Err(AttestationRulesError::EmptyUseCase);
        }

        self.eaa.push((use_case, Box::new(predicate)));
        Ok(self)
    }

    pub fn classify(&self, attestation: &AttestationIdentifier) -> Option<PurposePair> {
        if self.pid.iter().any(|predicate| predicate(attestation)) {
            return Some(PurposePair {
                issuance: VerificationContext::Pid,
                revocation: VerificationContext::PidStatus,
            });
        }
        if self.pub_eaa.iter().any(|predicate| predicate(attestation)) {
            return Some(PurposePair {
                issuance: VerificationContext::PubEaa,
                revocation: VerificationContext::PubEaaStatus,
            });
        }
        if self.qeaa.iter().any(|predicate| predicate(attestation)) {
            return Some(PurposePair {
                issuance: VerificationContext::Qeaa,
                revocation: VerificationContext::QeaaStatus,
            });
        }
        self.eaa
            .iter()
            .find(|(_, predicate)| predicate(attestation))
            .map(|(use_case, _)| PurposePair {
                issuance: VerificationContext::Eaa {
                    use_case: use_case.clone(),
                },
                revocation: VerificationContext::EaaStatus {
                    use_case: use_case.clone(),
                },
            })
    }
}

/// The dispatcher's answer for one attestation.
#[derive(Debug, PartialEq)]
pub enum AttestationOutcome<A> {
    Validated(ChainValidation<A>),
    /// No classification rule matched the attestation.
    UnknownAttestation,
    /// The attestation maps to a purpose no anchor source is configured
    /// for.
    PurposeNotConfigured,
}

/// Classifies attestations and evaluates issuer chains under the
/// resulting issuance purpose.
pub struct AttestationTrustDispatcher<C, A> {
    rules: AttestationRules,
    evaluator: ChainTrustEvaluator<C, A>,
}

impl<C, A> AttestationTrustDispatcher<C, A>
where
    C: Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
{
    pub fn new(rules: AttestationRules, evaluator: ChainTrustEvaluator<C, A>) -> Self {
        Self { rules, evaluator }
    }

    pub fn purposes(&self, attestation: &AttestationIdentifier) -> Option<PurposePair> {
        self.rules.classify(attestation)
    }

    pub async fn evaluate(
        &self,
        chain: &C,
        attestation: &AttestationIdentifier,
    ) -> Result<AttestationOutcome<A>, EvaluatorError> {
        let Some(pair) = self.rules.classify(attestation) else {
            return Ok(AttestationOutcome::UnknownAttestation);
        };

        match self.evaluator.evaluate(chain, &pair.issuance).await? {
            Some(verdict) => Ok(AttestationOutcome::Validated(verdict)),
            None => Ok(AttestationOutcome::PurposeNotConfigured),
        }
    }
}
