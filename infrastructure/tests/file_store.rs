//! Durability tests for the file-backed adapter.

mod common;

use application::{ContactStore, KeyValueStore, CONTACTS_KEY};
use domain::Category;
use infrastructure::FileKeyValueStore;
use std::sync::Arc;

#[tokio::test]
async fn values_round_trip_across_instances() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");

    let store = FileKeyValueStore::new(dir.path());
    store.set("settings", r#"{"orderBy":"name"}"#).await.unwrap();

    // A separate instance over the same directory observes the write.
    let reopened = FileKeyValueStore::new(dir.path());
    assert_eq!(
        reopened.get("settings").await.unwrap().as_deref(),
        Some(r#"{"orderBy":"name"}"#)
    );
}

#[tokio::test]
async fn missing_key_and_missing_directory_read_as_none() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");

    let store = FileKeyValueStore::new(dir.path().join("never-created"));
    assert!(store.get("contacts").await.unwrap().is_none());

    let store = FileKeyValueStore::new(dir.path());
    assert!(store.get("contacts").await.unwrap().is_none());
}

#[tokio::test]
async fn last_write_wins_per_key() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileKeyValueStore::new(dir.path());

    store.set("darkMode", "false").await.unwrap();
    store.set("darkMode", "true").await.unwrap();
    assert_eq!(store.get("darkMode").await.unwrap().as_deref(), Some("true"));
}

#[tokio::test]
async fn clear_empties_the_namespace_and_is_idempotent() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileKeyValueStore::new(dir.path());

    store.set("contacts", "[]").await.unwrap();
    store.set("settings", "{}").await.unwrap();

    store.clear().await.unwrap();
    assert!(store.get("contacts").await.unwrap().is_none());
    assert!(store.get("settings").await.unwrap().is_none());

    // Clearing again, or clearing a directory that never existed, succeeds.
    store.clear().await.unwrap();
    FileKeyValueStore::new(dir.path().join("absent"))
        .clear()
        .await
        .unwrap();
}

#[tokio::test]
async fn contact_store_persists_decodable_json_on_disk() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = Arc::new(FileKeyValueStore::new(dir.path()));

    let mut contacts = ContactStore::new(storage.clone());
    contacts.create("Ana", "111", Category::Personal).await;
    contacts.create("Beto", "222", Category::Work).await;

    // The raw payload is a plain JSON array of records.
    let raw = storage.get(CONTACTS_KEY).await.unwrap().expect("persisted");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    let records = parsed.as_array().expect("array payload");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Ana");
    assert_eq!(records[1]["category"], "work");

    // And a restarted store hydrates from it.
    let mut restarted = ContactStore::new(storage);
    restarted.load().await;
    assert_eq!(restarted.len(), 2);
}
