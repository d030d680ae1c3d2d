use url::Url;

use crate::trusted_list::fetcher::{DocumentFetcher, FetchError};
use crate::trusted_list::model::TrustedEntityList;

/// Fetches trusted lists as JSON over HTTP.
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    pub client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpDocumentFetcher {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<TrustedEntityList, FetchError> {
        let url = Url::parse(url).map_err(|error| FetchError::Http(error.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::Http(error.to_string()))?
            .error_for_status()
            .map_err(|error| FetchError::Http(error.to_string()))?;

        response
            .json()
            .await
            .map_err(|error| FetchError::InvalidDocument(error.to_string()))
    }
}
