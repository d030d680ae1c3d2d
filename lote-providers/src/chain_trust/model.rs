//! `struct`s and `enum`s for chain-trust evaluation.

use std::fmt;

/// Outcome of validating one chain against one anchor set.
#[derive(Clone, Debug, PartialEq)]
pub enum ChainValidation<A> {
    /// The chain terminates in this anchor.
    Trusted(A),
    NotTrusted(ValidationFailure),
}

/// Why a chain failed to validate.
///
/// Validator implementations fold their own failures into this value; the
/// evaluator never sees a validator error as anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationFailure {
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}
