//! Metadata fetcher trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use super::HtmlMeta;

/// Errors that can occur while fetching a page for preview metadata.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metadata fetching is disabled")]
    Disabled,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Trait for reading preview metadata from a target page.
///
/// Failures are never fatal to the caller: the shortening service logs them
/// and leaves the affected fields blank.
///
/// # Implementations
///
/// - [`crate::infrastructure::metadata::HttpMetadataFetcher`] - HTTP GET plus `<head>` parsing
/// - [`crate::infrastructure::metadata::NullMetadataFetcher`] - Always reports [`FetchError::Disabled`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetches `url` and extracts title, description, image and theme colour.
    async fn fetch(&self, url: &str) -> Result<HtmlMeta, FetchError>;
}
