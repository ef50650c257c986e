//! Short code resolution.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ShortenError;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlStore;

/// Resolves short codes and counts hits.
pub struct LookupService<S: ?Sized = dyn UrlStore> {
    store: Arc<S>,
}

impl<S: UrlStore + ?Sized> LookupService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolves `code` and counts one hit.
    ///
    /// The increment is durable before this returns. The returned record
    /// carries the updated hit count.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenError::NotFound`] for unknown codes, including a code
    /// that disappears between the read and the increment.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, ShortenError> {
        let mut record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| ShortenError::NotFound(code.to_string()))?;

        record.hit_count = self.store.increment_hits(code).await?;
        debug!(code = %code, hits = record.hit_count, "Resolved short code");

        Ok(record)
    }

    /// Reads a record without counting a hit.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenError::NotFound`] for unknown codes.
    pub async fn get(&self, code: &str) -> Result<UrlRecord, ShortenError> {
        self.store
            .get(code)
            .await?
            .ok_or_else(|| ShortenError::NotFound(code.to_string()))
    }
}
