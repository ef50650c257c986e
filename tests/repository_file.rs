mod common;

use common::store_contract;
use linkpeek::domain::error::StoreError;
use linkpeek::domain::repositories::UrlStore;
use linkpeek::infrastructure::persistence::{FileStore, read_snapshot};
use serde_json::Value;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path().join("urls.json")).await.unwrap()
}

#[tokio::test]
async fn test_get_and_exists() {
    let dir = TempDir::new().unwrap();
    store_contract::get_and_exists(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_insert_dedupe_returns_existing() {
    let dir = TempDir::new().unwrap();
    store_contract::insert_dedupe_returns_existing(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_insert_collision_is_already_exists() {
    let dir = TempDir::new().unwrap();
    store_contract::insert_collision_is_already_exists(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_reverse_index_keeps_first_record() {
    let dir = TempDir::new().unwrap();
    store_contract::reverse_index_keeps_first_record(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_find_by_target_respects_signature() {
    let dir = TempDir::new().unwrap();
    store_contract::find_by_target_respects_signature(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_increment_hits() {
    let dir = TempDir::new().unwrap();
    store_contract::increment_hits(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_put_overwrites() {
    let dir = TempDir::new().unwrap();
    store_contract::put_overwrites(&open_store(&dir).await).await;
}

#[tokio::test]
async fn test_missing_file_is_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert_eq!(store.count().await.unwrap(), 0);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = open_store(&dir).await;
        store
            .insert(common::record("keep01", "https://example.com"), true)
            .await
            .unwrap();
        store.increment_hits("keep01").await.unwrap();
    }

    let reopened = open_store(&dir).await;
    let found = reopened.get("keep01").await.unwrap().unwrap();
    assert_eq!(found.target_url, "https://example.com");
    assert_eq!(found.hit_count, 1);
}

#[tokio::test]
async fn test_snapshot_format_is_versioned_and_sorted() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .insert(common::record("zzz999", "https://z.example.com"), true)
        .await
        .unwrap();
    store
        .insert(common::record("aaa111", "https://a.example.com"), true)
        .await
        .unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["version"], 1);
    assert_eq!(json["records"][0]["code"], "aaa111");
    assert_eq!(json["records"][1]["code"], "zzz999");
    assert!(!dir.path().join("urls.json.tmp").exists());
}

#[tokio::test]
async fn test_legacy_snapshot_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.json");
    std::fs::write(&path, r#"{"old123": "https://legacy.example.com"}"#).unwrap();

    let store = FileStore::open(&path).await.unwrap();

    let found = store.get("old123").await.unwrap().unwrap();
    assert_eq!(found.target_url, "https://legacy.example.com");
    assert_eq!(found.hit_count, 0);

    let records = read_snapshot(&path).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_unparsable_snapshot_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = FileStore::open(&path).await;

    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.json");
    let store = FileStore::open(&path).await.unwrap();

    store
        .insert(common::record("before", "https://example.com/1"), true)
        .await
        .unwrap();

    // A directory where the temporary file should go makes the next write fail.
    std::fs::create_dir(dir.path().join("urls.json.tmp")).unwrap();

    let err = store
        .insert(common::record("after1", "https://example.com/2"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));

    let hits = store.increment_hits("before").await;
    assert!(hits.is_err());

    assert!(!store.exists("after1").await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.get("before").await.unwrap().unwrap().hit_count, 0);

    let on_disk = read_snapshot(&path).await.unwrap();
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].code, "before");
}
