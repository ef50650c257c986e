//! Short link representation shared by the create and lookup endpoints.

use serde::Serialize;

use crate::domain::entities::{UrlMetadata, UrlRecord};

/// A short link as returned by the API.
///
/// ```json
/// {
///   "short": "abc123",
///   "shortUrl": "https://s.example.com/abc123",
///   "url": "https://example.com",
///   "meta": null,
///   "count": 0
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub short: String,
    pub short_url: String,
    pub url: String,
    pub meta: Option<UrlMetadata>,
    pub count: u64,
}

impl LinkResponse {
    pub fn from_record(record: UrlRecord, short_url: String) -> Self {
        Self {
            short: record.code,
            short_url,
            url: record.target_url,
            meta: record.meta,
            count: record.hit_count,
        }
    }
}
