// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the JSON-file collection store.

use serde_json::json;
use servineo_core::{CollectionStore, HealthStatus, PluginAdapter, ServineoError};
use servineo_storage::JsonFileStore;

#[tokio::test]
async fn missing_collection_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.load("requests").await.unwrap().is_empty());
}

#[tokio::test]
async fn save_then_load_from_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let items = vec![json!({"id": "SOL-1"}), json!({"id": "SOL-2"})];

    JsonFileStore::new(dir.path())
        .save("requests", items.clone())
        .await
        .unwrap();

    // A second store over the same directory sees the data.
    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(reopened.load("requests").await.unwrap(), items);
    assert!(dir.path().join("requests.json").exists());
    assert!(!dir.path().join("requests.json.tmp").exists());
}

#[tokio::test]
async fn save_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = JsonFileStore::new(&nested);

    store.save("recent_requests", vec![json!(1)]).await.unwrap();
    assert_eq!(store.load("recent_requests").await.unwrap(), vec![json!(1)]);
}

#[tokio::test]
async fn keys_with_path_separators_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    for key in ["../escape", "a/b", ""] {
        let err = store.load(key).await.unwrap_err();
        assert!(matches!(err, ServineoError::Storage { .. }), "{key:?}");
    }
}

#[tokio::test]
async fn corrupt_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("requests.json"), "{not json").unwrap();
    let store = JsonFileStore::new(dir.path());

    let err = store.load("requests").await.unwrap_err();
    assert!(matches!(err, ServineoError::Storage { .. }));
}

#[tokio::test]
async fn health_reflects_directory_state() {
    let dir = tempfile::tempdir().unwrap();
    let missing = JsonFileStore::new(dir.path().join("later"));
    assert!(matches!(
        missing.health_check().await.unwrap(),
        HealthStatus::Degraded(_)
    ));

    missing.initialize().await.unwrap();
    assert_eq!(missing.health_check().await.unwrap(), HealthStatus::Healthy);
}
