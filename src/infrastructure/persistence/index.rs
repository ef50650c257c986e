//! In-process forward and reverse index shared by the memory and snapshot stores.

use std::collections::HashMap;

use crate::domain::entities::UrlRecord;
use crate::domain::error::StoreError;

type TargetKey = (String, String);

/// Code → record map plus (target, signature) → code reverse map.
///
/// All mutations go through methods that update both maps together; callers
/// wrap the index in a single lock.
#[derive(Debug, Clone, Default)]
pub struct UrlIndex {
    by_code: HashMap<String, UrlRecord>,
    by_target: HashMap<TargetKey, String>,
}

impl UrlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from stored records.
    ///
    /// Records are replayed oldest first so the reverse map points at the
    /// earliest record for each (target, signature) pair. Later duplicates of
    /// a code win.
    pub fn from_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        let mut records: Vec<UrlRecord> = records.into_iter().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut index = Self::new();
        for record in records {
            index.put(record);
        }
        index
    }

    pub fn get(&self, code: &str) -> Option<&UrlRecord> {
        self.by_code.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn find_by_target(&self, target_url: &str, meta_signature: &str) -> Option<&UrlRecord> {
        self.by_target
            .get(&(target_url.to_string(), meta_signature.to_string()))
            .and_then(|code| self.by_code.get(code))
    }

    pub fn insert(&mut self, record: UrlRecord, dedupe: bool) -> Result<UrlRecord, StoreError> {
        if dedupe
            && let Some(existing) = self.find_by_target(&record.target_url, &record.meta_signature)
        {
            return Ok(existing.clone());
        }

        if self.by_code.contains_key(&record.code) {
            return Err(StoreError::AlreadyExists(record.code));
        }

        self.by_target
            .entry(target_key(&record))
            .or_insert_with(|| record.code.clone());
        self.by_code.insert(record.code.clone(), record.clone());

        Ok(record)
    }

    pub fn put(&mut self, record: UrlRecord) {
        let code = record.code.clone();
        let key = target_key(&record);

        if let Some(previous) = self.by_code.insert(code.clone(), record) {
            let previous_key = target_key(&previous);
            if previous_key != key && self.by_target.get(&previous_key) == Some(&code) {
                self.by_target.remove(&previous_key);
                self.repoint(previous_key);
            }
        }

        self.by_target.entry(key).or_insert(code);
    }

    pub fn increment_hits(&mut self, code: &str) -> Result<u64, StoreError> {
        let record = self
            .by_code
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        record.hit_count = record.hit_count.saturating_add(1);
        Ok(record.hit_count)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Records ordered by code.
    pub fn sorted_records(&self) -> Vec<&UrlRecord> {
        let mut records: Vec<&UrlRecord> = self.by_code.values().collect();
        records.sort_by(|a, b| a.code.cmp(&b.code));
        records
    }

    /// Points a reverse key at the oldest remaining record with that key, if any.
    fn repoint(&mut self, key: TargetKey) {
        let replacement = self
            .by_code
            .values()
            .filter(|r| r.target_url == key.0 && r.meta_signature == key.1)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)))
            .map(|r| r.code.clone());

        if let Some(code) = replacement {
            self.by_target.insert(key, code);
        }
    }
}

fn target_key(record: &UrlRecord) -> TargetKey {
    (record.target_url.clone(), record.meta_signature.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlMetadata;

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord::new(
            code.to_string(),
            url.to_string(),
            None,
            UrlMetadata::signature(None),
        )
    }

    #[test]
    fn test_insert_updates_both_indexes() {
        let mut index = UrlIndex::new();
        index.insert(record("abc", "https://x.com"), true).unwrap();

        assert_eq!(index.get("abc").unwrap().target_url, "https://x.com");
        assert_eq!(
            index
                .find_by_target("https://x.com", &UrlMetadata::signature(None))
                .unwrap()
                .code,
            "abc"
        );
    }

    #[test]
    fn test_insert_with_dedupe_returns_existing() {
        let mut index = UrlIndex::new();
        index.insert(record("abc", "https://x.com"), true).unwrap();

        let returned = index.insert(record("def", "https://x.com"), true).unwrap();

        assert_eq!(returned.code, "abc");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_insert_without_dedupe_keeps_first_reverse_entry() {
        let mut index = UrlIndex::new();
        index.insert(record("abc", "https://x.com"), true).unwrap();
        index.insert(record("alias", "https://x.com"), false).unwrap();

        assert_eq!(index.len(), 2);
        let found = index
            .find_by_target("https://x.com", &UrlMetadata::signature(None))
            .unwrap();
        assert_eq!(found.code, "abc");
    }

    #[test]
    fn test_insert_code_collision() {
        let mut index = UrlIndex::new();
        index.insert(record("abc", "https://x.com"), false).unwrap();

        let err = index
            .insert(record("abc", "https://y.com"), false)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(ref c) if c == "abc"));
    }

    #[test]
    fn test_put_overwrite_moves_reverse_entry() {
        let mut index = UrlIndex::new();
        index.put(record("abc", "https://x.com"));
        index.put(record("abc", "https://y.com"));

        let sig = UrlMetadata::signature(None);
        assert!(index.find_by_target("https://x.com", &sig).is_none());
        assert_eq!(index.find_by_target("https://y.com", &sig).unwrap().code, "abc");
    }

    #[test]
    fn test_put_overwrite_repoints_to_remaining_record() {
        let mut index = UrlIndex::new();
        index.put(record("abc", "https://x.com"));
        index.put(record("alias", "https://x.com"));
        index.put(record("abc", "https://y.com"));

        let sig = UrlMetadata::signature(None);
        assert_eq!(
            index.find_by_target("https://x.com", &sig).unwrap().code,
            "alias"
        );
    }

    #[test]
    fn test_increment_hits() {
        let mut index = UrlIndex::new();
        index.put(record("abc", "https://x.com"));

        assert_eq!(index.increment_hits("abc").unwrap(), 1);
        assert_eq!(index.increment_hits("abc").unwrap(), 2);
        assert!(matches!(
            index.increment_hits("missing"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_from_records_reverse_entry_is_oldest() {
        let mut newer = record("aaa", "https://x.com");
        let mut older = record("zzz", "https://x.com");
        older.created_at = newer.created_at - chrono::Duration::hours(1);
        newer.hit_count = 4;

        let index = UrlIndex::from_records([newer, older]);

        let found = index
            .find_by_target("https://x.com", &UrlMetadata::signature(None))
            .unwrap();
        assert_eq!(found.code, "zzz");
        assert_eq!(index.get("aaa").unwrap().hit_count, 4);
    }
}
