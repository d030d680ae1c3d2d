//! Enumerates errors related to anchor lookup.

use thiserror::Error;

use crate::trusted_list::fetcher::FetchError;

/// `Clone` so that one failed lookup can be shared with every cache
/// waiter coalesced onto it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnchorSourceError {
    #[error("trusted list fetch failed: `{0}`")]
    Fetch(#[from] FetchError),
    #[error("anchor lookup failed: `{0}`")]
    Lookup(String),
}
