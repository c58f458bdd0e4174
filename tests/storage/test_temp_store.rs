// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use futures::future::join_all;
use media_tools_node::storage::TempFileStore;
use tempfile::TempDir;

async fn store(dir: &TempDir, unique: bool) -> TempFileStore {
    TempFileStore::new(dir.path().join("uploads"), dir.path().join("results"), unique)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_new_creates_directories() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, true).await;

    assert!(store.upload_dir().is_dir());
    assert!(store.result_dir().is_dir());
    assert!(store.result_dir().is_absolute());
}

#[tokio::test]
async fn test_purge_removes_leftover_uploads() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, true).await;

    std::fs::write(store.upload_dir().join("stale-1.png"), b"x").unwrap();
    std::fs::write(store.upload_dir().join("stale-2.png"), b"y").unwrap();

    assert_eq!(store.purge_uploads().await.unwrap(), 2);
    assert_eq!(std::fs::read_dir(store.upload_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_concurrent_writers_never_tear_shared_result() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir, false).await;
    let target = store.result_dir().join("shared_cleaned.png");

    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 64 * 1024]).collect();
    let writes = payloads.iter().map(|data| store.persist_result(&target, data));
    for result in join_all(writes).await {
        result.unwrap();
    }

    let written = std::fs::read(&target).unwrap();
    assert_eq!(written.len(), 64 * 1024);
    assert!(written.iter().all(|b| *b == written[0]));

    let names: Vec<_> = std::fs::read_dir(store.result_dir())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name())
        .collect();
    assert_eq!(names.len(), 1, "partial files left behind: {:?}", names);
}
