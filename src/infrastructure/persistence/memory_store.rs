//! In-memory implementation of the URL store.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::index::UrlIndex;
use crate::domain::entities::UrlRecord;
use crate::domain::error::StoreError;
use crate::domain::repositories::UrlStore;

/// Process-local store. Contents are lost on restart.
///
/// Both indexes sit behind one [`RwLock`]: lookups share the read lock,
/// mutations take the write lock for the whole two-index update.
#[derive(Debug, Default)]
pub struct MemoryStore {
    index: RwLock<UrlIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        Self {
            index: RwLock::new(UrlIndex::from_records(records)),
        }
    }
}

#[async_trait]
impl UrlStore for MemoryStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.index.read().get(code).cloned())
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.index.read().contains(code))
    }

    async fn find_by_target(
        &self,
        target_url: &str,
        meta_signature: &str,
    ) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self
            .index
            .read()
            .find_by_target(target_url, meta_signature)
            .cloned())
    }

    async fn insert(&self, record: UrlRecord, dedupe: bool) -> Result<UrlRecord, StoreError> {
        self.index.write().insert(record, dedupe)
    }

    async fn put(&self, record: UrlRecord) -> Result<(), StoreError> {
        self.index.write().put(record);
        Ok(())
    }

    async fn increment_hits(&self, code: &str) -> Result<u64, StoreError> {
        self.index.write().increment_hits(code)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.index.read().len() as u64)
    }
}
