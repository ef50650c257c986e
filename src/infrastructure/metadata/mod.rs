//! Link preview metadata fetching.
//!
//! Provides a [`MetadataFetcher`] trait with two implementations:
//! - [`HttpMetadataFetcher`] - Downloads the target page and parses its `<head>`
//! - [`NullMetadataFetcher`] - Never fetches; used when enrichment is disabled

mod html_meta;
mod http_fetcher;
mod null_fetcher;
mod service;

pub use html_meta::{HtmlMeta, extract_html_meta};
pub use http_fetcher::{BROWSER_USER_AGENT, HttpMetadataFetcher};
pub use null_fetcher::NullMetadataFetcher;
#[cfg(test)]
pub use service::MockMetadataFetcher;
pub use service::{FetchError, MetadataFetcher};
