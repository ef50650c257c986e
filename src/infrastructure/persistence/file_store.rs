//! JSON snapshot implementation of the URL store.
//!
//! The whole store is one JSON document. Every mutation rewrites it: the new
//! state is serialised to a temporary file next to the target, synced, and
//! renamed over the old snapshot while the write lock is held, so readers
//! never see a half-written file or an index that disagrees with disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::index::UrlIndex;
use crate::domain::entities::{UrlMetadata, UrlRecord};
use crate::domain::error::StoreError;
use crate::domain::repositories::UrlStore;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    records: Vec<UrlRecord>,
}

/// Accepted on-disk layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Current(Snapshot),
    /// Flat `{"<code>": "<target>"}` map written by early prototypes.
    Legacy(HashMap<String, String>),
}

/// Reads every record from a snapshot file.
///
/// Accepts both the versioned format and the legacy flat code → URL map.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read and
/// [`StoreError::Serialization`] if it is not a recognised snapshot.
pub async fn read_snapshot(path: &Path) -> Result<Vec<UrlRecord>, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    parse_snapshot(&bytes)
}

fn parse_snapshot(bytes: &[u8]) -> Result<Vec<UrlRecord>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let records = match serde_json::from_slice::<SnapshotFile>(bytes)? {
        SnapshotFile::Current(snapshot) => snapshot.records,
        SnapshotFile::Legacy(map) => map
            .into_iter()
            .map(|(code, target_url)| {
                UrlRecord::new(code, target_url, None, UrlMetadata::signature(None))
            })
            .collect(),
    };

    Ok(records)
}

/// Store persisted as a JSON snapshot file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    index: RwLock<UrlIndex>,
}

impl FileStore {
    /// Opens the snapshot at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let records = match read_snapshot(&path).await {
            Ok(records) => records,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Snapshot not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        info!(path = %path.display(), records = records.len(), "Snapshot loaded");

        Ok(Self {
            path,
            index: RwLock::new(UrlIndex::from_records(records)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `mutation` to a copy of the index, persists the copy and only
    /// then makes it current. Nothing changes if either step fails.
    async fn mutate<T>(
        &self,
        mutation: impl FnOnce(&mut UrlIndex) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut index = self.index.write().await;

        let mut next = index.clone();
        let output = mutation(&mut next)?;
        self.persist(&next).await?;

        *index = next;
        Ok(output)
    }

    async fn persist(&self, index: &UrlIndex) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            records: index.sorted_records().into_iter().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UrlStore for FileStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.index.read().await.get(code).cloned())
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.index.read().await.contains(code))
    }

    async fn find_by_target(
        &self,
        target_url: &str,
        meta_signature: &str,
    ) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self
            .index
            .read()
            .await
            .find_by_target(target_url, meta_signature)
            .cloned())
    }

    async fn insert(&self, record: UrlRecord, dedupe: bool) -> Result<UrlRecord, StoreError> {
        {
            // Dedupe hits change nothing, so they skip the rewrite.
            let index = self.index.read().await;
            if dedupe
                && let Some(existing) =
                    index.find_by_target(&record.target_url, &record.meta_signature)
            {
                return Ok(existing.clone());
            }
        }

        self.mutate(|index| index.insert(record, dedupe)).await
    }

    async fn put(&self, record: UrlRecord) -> Result<(), StoreError> {
        self.mutate(|index| {
            index.put(record);
            Ok(())
        })
        .await
    }

    async fn increment_hits(&self, code: &str) -> Result<u64, StoreError> {
        self.mutate(|index| index.increment_hits(code)).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.index.read().await.len() as u64)
    }
}
