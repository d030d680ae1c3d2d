use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::anchor_source::imp::static_source::StaticSource;

type Chain = Vec<String>;

fn anchors(values: Vec<&str>) -> NonEmpty<String> {
    NonEmpty::from_vec(values.into_iter().map(str::to_string).collect()).unwrap()
}

fn nullary_source(values: Vec<&str>) -> Arc<dyn AnchorSource<(), String>> {
    Arc::new(StaticSource::from_entries([((), anchors(values))]))
}

fn empty_nullary_source() -> Arc<dyn AnchorSource<(), String>> {
    Arc::new(StaticSource::<(), String>::from_entries([]))
}

/// Trusts a chain iff the anchor set contains the chain's last element.
struct LastElementValidator {
    calls: AtomicUsize,
}

impl LastElementValidator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ValidateCertificateChain<Chain, String> for LastElementValidator {
    async fn validate(&self, chain: &Chain, anchors: &NonEmpty<String>) -> ChainValidation<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match chain.last() {
            Some(root) if anchors.contains(root) => ChainValidation::Trusted(root.clone()),
            _ => ChainValidation::NotTrusted(ValidationFailure::new("chain is not anchored")),
        }
    }
}

struct FixedRecovery {
    alternative: Option<Arc<dyn AnchorSource<(), String>>>,
}

impl RecoveryStrategy<String> for FixedRecovery {
    fn recover(&self, _failure: &ValidationFailure) -> Option<Arc<dyn AnchorSource<(), String>>> {
        self.alternative.clone()
    }
}

fn chain(leaf: &str, root: &str) -> Chain {
    vec![leaf.to_string(), root.to_string()]
}

fn evaluator(
    validator: Arc<LastElementValidator>,
    sources: Vec<(VerificationContext, Arc<dyn AnchorSource<(), String>>)>,
) -> ChainTrustEvaluator<Chain, String> {
    ChainTrustEvaluator::new(validator, sources.into_iter().collect())
}

#[tokio::test]
async fn test_trusted_chain_returns_the_matched_anchor() {
    let evaluator = evaluator(
        LastElementValidator::new(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    );

    let verdict = evaluator
        .evaluate(&chain("leaf", "pid-root"), &VerificationContext::Pid)
        .await
        .unwrap();

    assert_eq!(
        verdict,
        Some(ChainValidation::Trusted("pid-root".to_string()))
    );
}

#[tokio::test]
async fn test_unconfigured_purpose_is_none() {
    let evaluator = evaluator(
        LastElementValidator::new(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    );

    let verdict = evaluator
        .evaluate(&chain("leaf", "root"), &VerificationContext::Qeaa)
        .await
        .unwrap();

    assert_eq!(verdict, None);
}

#[tokio::test]
async fn test_configured_purpose_without_anchors_fails_loud() {
    let evaluator = evaluator(
        LastElementValidator::new(),
        vec![(VerificationContext::Pid, empty_nullary_source())],
    );

    let result = evaluator
        .evaluate(&chain("leaf", "root"), &VerificationContext::Pid)
        .await;

    assert_eq!(
        result.err().unwrap(),
        EvaluatorError::MisconfiguredSource(VerificationContext::Pid)
    );
}

#[tokio::test]
async fn test_recovery_anchors_can_rescue_a_rejected_chain() {
    let validator = LastElementValidator::new();
    let evaluator = evaluator(
        validator.clone(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    )
    .with_recovery(
        VerificationContext::Pid,
        Arc::new(FixedRecovery {
            alternative: Some(nullary_source(vec!["migration-root"])),
        }),
    );

    let verdict = evaluator
        .evaluate(&chain("leaf", "migration-root"), &VerificationContext::Pid)
        .await
        .unwrap();

    assert_eq!(
        verdict,
        Some(ChainValidation::Trusted("migration-root".to_string()))
    );
    assert_eq!(validator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_recovery_returns_the_original_cause() {
    let validator = LastElementValidator::new();
    let evaluator = evaluator(
        validator.clone(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    )
    .with_recovery(
        VerificationContext::Pid,
        Arc::new(FixedRecovery {
            alternative: Some(nullary_source(vec!["other-root"])),
        }),
    );

    let verdict = evaluator
        .evaluate(&chain("leaf", "unknown-root"), &VerificationContext::Pid)
        .await
        .unwrap();

    // recovery ran exactly once and the first verdict's cause survived
    assert_eq!(
        verdict,
        Some(ChainValidation::NotTrusted(ValidationFailure::new(
            "chain is not anchored"
        )))
    );
    assert_eq!(validator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_declined_recovery_leaves_the_verdict_untouched() {
    let validator = LastElementValidator::new();
    let evaluator = evaluator(
        validator.clone(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    )
    .with_recovery(
        VerificationContext::Pid,
        Arc::new(FixedRecovery { alternative: None }),
    );

    let verdict = evaluator
        .evaluate(&chain("leaf", "unknown-root"), &VerificationContext::Pid)
        .await
        .unwrap();

    assert!(matches!(verdict, Some(ChainValidation::NotTrusted(_))));
    assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_merge_is_right_biased() {
    let left = evaluator(
        LastElementValidator::new(),
        vec![
            (VerificationContext::Pid, nullary_source(vec!["left-pid"])),
            (VerificationContext::Qeaa, nullary_source(vec!["left-qeaa"])),
        ],
    );
    let right = evaluator(
        LastElementValidator::new(),
        vec![(VerificationContext::Pid, nullary_source(vec!["right-pid"]))],
    );

    let merged = left.merge(right);

    let verdict = merged
        .evaluate(&chain("leaf", "right-pid"), &VerificationContext::Pid)
        .await
        .unwrap();
    assert_eq!(
        verdict,
        Some(ChainValidation::Trusted("right-pid".to_string()))
    );

    let verdict = merged
        .evaluate(&chain("leaf", "left-qeaa"), &VerificationContext::Qeaa)
        .await
        .unwrap();
    assert_eq!(
        verdict,
        Some(ChainValidation::Trusted("left-qeaa".to_string()))
    );
}

#[tokio::test]
async fn test_contra_map_chain_adapts_the_chain_representation() {
    let evaluator = evaluator(
        LastElementValidator::new(),
        vec![(VerificationContext::Pid, nullary_source(vec!["pid-root"]))],
    )
    .contra_map_chain(|joined: &String| {
        joined.split(',').map(str::to_string).collect::<Chain>()
    });

    let verdict = evaluator
        .evaluate(&"leaf,pid-root".to_string(), &VerificationContext::Pid)
        .await
        .unwrap();

    assert_eq!(
        verdict,
        Some(ChainValidation::Trusted("pid-root".to_string()))
    );
}
