use lote_providers::caching::CacheParams;
use lote_providers::trusted_list::loader::LoaderParams;
use lote_providers::verification::ListProfile;

pub struct LoteCoreConfig {
    pub loader_config: LoaderParams,
    pub cache_config: CacheParams,
    /// Where each profile's trusted list is published.
    pub list_endpoints: Vec<ListEndpoint>,
}

#[derive(Clone, Debug)]
pub struct ListEndpoint {
    pub profile: ListProfile,
    pub url: String,
}

impl ListEndpoint {
    pub fn new(profile: ListProfile, url: impl Into<String>) -> Self {
        Self {
            profile,
            url: url.into(),
        }
    }
}

impl Default for LoteCoreConfig {
    fn default() -> Self {
        Self {
            loader_config: LoaderParams::default(),
            cache_config: CacheParams::default(),
            list_endpoints: vec![],
        }
    }
}
