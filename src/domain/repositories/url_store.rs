//! Repository trait for short link data access.

use crate::domain::entities::UrlRecord;
use crate::domain::error::StoreError;
use async_trait::async_trait;

/// Authoritative mapping between short codes and target URLs.
///
/// Implementations keep two indexes: code → record and
/// (target URL, metadata signature) → code. Both are updated as one unit,
/// so readers never observe a record in one index but not the other.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryStore`] - process-local maps
/// - [`crate::infrastructure::persistence::FileStore`] - JSON snapshot on disk
/// - [`crate::infrastructure::persistence::SqliteStore`] - single-table SQLite
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Finds a record by its short code.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the lookup itself fails.
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Checks whether a short code is taken.
    async fn exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Finds the record created first for a target URL and metadata signature.
    ///
    /// Two requests for the same target are duplicates only when their
    /// metadata signatures match as well.
    async fn find_by_target(
        &self,
        target_url: &str,
        meta_signature: &str,
    ) -> Result<Option<UrlRecord>, StoreError>;

    /// Creates a new record.
    ///
    /// When `dedupe` is set and a record with the same target URL and
    /// metadata signature already exists, that record is returned and nothing
    /// is written. The check and the write happen atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the short code is taken.
    async fn insert(&self, record: UrlRecord, dedupe: bool) -> Result<UrlRecord, StoreError>;

    /// Inserts or overwrites a record, updating both indexes in one step.
    async fn put(&self, record: UrlRecord) -> Result<(), StoreError>;

    /// Atomically adds one to the hit counter and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the code does not exist.
    async fn increment_hits(&self, code: &str) -> Result<u64, StoreError>;

    /// Counts live records.
    async fn count(&self) -> Result<u64, StoreError>;
}
