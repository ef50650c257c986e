//! Behaviour every `UrlStore` backend must share.

use linkpeek::domain::entities::{UrlMetadata, UrlRecord};
use linkpeek::domain::error::StoreError;
use linkpeek::domain::repositories::UrlStore;

use super::record;

pub async fn get_and_exists(store: &dyn UrlStore) {
    assert!(store.get("abc123").await.unwrap().is_none());
    assert!(!store.exists("abc123").await.unwrap());

    store
        .insert(record("abc123", "https://example.com"), true)
        .await
        .unwrap();

    let found = store.get("abc123").await.unwrap().unwrap();
    assert_eq!(found.target_url, "https://example.com");
    assert!(store.exists("abc123").await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

pub async fn insert_dedupe_returns_existing(store: &dyn UrlStore) {
    let first = store
        .insert(record("first1", "https://example.com"), true)
        .await
        .unwrap();
    let second = store
        .insert(record("second", "https://example.com"), true)
        .await
        .unwrap();

    assert_eq!(first.code, "first1");
    assert_eq!(second.code, "first1");
    assert!(!store.exists("second").await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

pub async fn insert_collision_is_already_exists(store: &dyn UrlStore) {
    store
        .insert(record("taken", "https://a.example.com"), false)
        .await
        .unwrap();

    let err = store
        .insert(record("taken", "https://b.example.com"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::AlreadyExists(ref c) if c == "taken"));
    assert_eq!(
        store.get("taken").await.unwrap().unwrap().target_url,
        "https://a.example.com"
    );
}

pub async fn reverse_index_keeps_first_record(store: &dyn UrlStore) {
    let signature = UrlMetadata::signature(None);

    store
        .insert(record("gen123", "https://example.com"), true)
        .await
        .unwrap();
    store
        .insert(record("alias", "https://example.com"), false)
        .await
        .unwrap();

    let found = store
        .find_by_target("https://example.com", &signature)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.code, "gen123");
    assert_eq!(store.count().await.unwrap(), 2);
}

pub async fn find_by_target_respects_signature(store: &dyn UrlStore) {
    let meta = UrlMetadata::new("Title", "", "", "");
    store
        .insert(
            super::record_with_meta("meta01", "https://example.com", meta.clone()),
            true,
        )
        .await
        .unwrap();

    assert!(
        store
            .find_by_target("https://example.com", &UrlMetadata::signature(None))
            .await
            .unwrap()
            .is_none()
    );

    let found = store
        .find_by_target("https://example.com", &UrlMetadata::signature(Some(&meta)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.code, "meta01");
    assert_eq!(found.meta, Some(meta));
}

pub async fn increment_hits(store: &dyn UrlStore) {
    store
        .insert(record("hits01", "https://example.com"), true)
        .await
        .unwrap();

    assert_eq!(store.increment_hits("hits01").await.unwrap(), 1);
    assert_eq!(store.increment_hits("hits01").await.unwrap(), 2);
    assert_eq!(store.get("hits01").await.unwrap().unwrap().hit_count, 2);

    assert!(matches!(
        store.increment_hits("nope").await,
        Err(StoreError::NotFound(ref c)) if c == "nope"
    ));
}

pub async fn put_overwrites(store: &dyn UrlStore) {
    let mut imported: UrlRecord = record("old001", "https://old.example.com");
    imported.hit_count = 41;
    store.put(imported).await.unwrap();

    let mut replaced = record("old001", "https://new.example.com");
    replaced.hit_count = 42;
    store.put(replaced).await.unwrap();

    let found = store.get("old001").await.unwrap().unwrap();
    assert_eq!(found.target_url, "https://new.example.com");
    assert_eq!(found.hit_count, 42);
    assert_eq!(store.count().await.unwrap(), 1);

    let signature = UrlMetadata::signature(None);
    assert!(
        store
            .find_by_target("https://old.example.com", &signature)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .find_by_target("https://new.example.com", &signature)
            .await
            .unwrap()
            .is_some()
    );
}
