//! Fetching trusted-list documents.
//!
//! The loader takes a fetcher as an injected collaborator; the core never
//! performs network I/O itself. [`imp::http`] provides the adapter most
//! deployments use.

pub mod imp;

use thiserror::Error;

use super::model::TrustedEntityList;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<TrustedEntityList, FetchError>;
}

/// `Clone` so a failed fetch can be carried inside load events and shared
/// with every cache waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("HTTP error: `{0}`")]
    Http(String),
    #[error("invalid trusted list document: `{0}`")]
    InvalidDocument(String),
    #[error("other fetch error: `{0}`")]
    Other(String),
}
