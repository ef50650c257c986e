//! URL record entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UrlMetadata;

/// A short code mapped to its target URL.
///
/// `meta_signature` is the hash of the metadata the caller supplied at
/// creation time, before enrichment, so dedupe decisions stay deterministic
/// even when the target page changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub code: String,
    pub target_url: String,
    #[serde(default)]
    pub meta: Option<UrlMetadata>,
    pub meta_signature: String,
    #[serde(default)]
    pub hit_count: u64,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a fresh record with a zero hit count.
    pub fn new(
        code: String,
        target_url: String,
        meta: Option<UrlMetadata>,
        meta_signature: String,
    ) -> Self {
        Self {
            code,
            target_url,
            meta,
            meta_signature,
            hit_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the record should render a preview page instead of redirecting.
    pub fn has_preview(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| !m.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = UrlRecord::new(
            "abc123".to_string(),
            "https://example.com".to_string(),
            None,
            UrlMetadata::signature(None),
        );

        assert_eq!(record.code, "abc123");
        assert_eq!(record.target_url, "https://example.com");
        assert_eq!(record.hit_count, 0);
        assert!(!record.has_preview());
    }

    #[test]
    fn test_record_with_preview() {
        let meta = UrlMetadata::new("Title", "", "", "");
        let record = UrlRecord::new(
            "abc".to_string(),
            "https://example.com".to_string(),
            Some(meta.clone()),
            UrlMetadata::signature(Some(&meta)),
        );

        assert!(record.has_preview());
    }
}
