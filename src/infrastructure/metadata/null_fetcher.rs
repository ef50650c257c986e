//! No-op metadata fetcher for disabled enrichment.

use async_trait::async_trait;
use tracing::debug;

use super::HtmlMeta;
use super::service::{FetchError, MetadataFetcher};

/// A fetcher that never touches the network.
///
/// Used when `METADATA_FETCH=false` and in tests, so caller-supplied
/// metadata is stored exactly as given.
pub struct NullMetadataFetcher;

impl NullMetadataFetcher {
    pub fn new() -> Self {
        debug!("Using NullMetadataFetcher (enrichment disabled)");
        Self
    }
}

impl Default for NullMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataFetcher for NullMetadataFetcher {
    async fn fetch(&self, _url: &str) -> Result<HtmlMeta, FetchError> {
        Err(FetchError::Disabled)
    }
}
