// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store behavior under concurrency and failure.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use callsight_config::model::StorageConfig;
use callsight_core::{CallsightError, Insight, RecordStore, Sentiment, Transcript};
use callsight_storage::SqliteRecordStore;

fn config(path: &Path, pool_size: usize) -> StorageConfig {
    StorageConfig {
        database_url: Some(path.display().to_string()),
        pool_size,
        ..StorageConfig::default()
    }
}

fn insight(n: usize) -> Insight {
    Insight::new(
        format!("intent {n}"),
        Sentiment::Neutral,
        n % 2 == 0,
        format!("Summary for call {n}."),
    )
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_get_unique_increasing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteRecordStore::new(&config(&dir.path().join("c.db"), 4)).unwrap());
    store.initialize().await.unwrap();

    let tasks: Vec<_> = (0..24)
        .map(|n| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let transcript = Transcript::new(format!("Agent: call {n}")).unwrap();
                store.insert(&transcript, &insight(n)).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for result in futures::future::join_all(tasks).await {
        ids.push(result.unwrap().unwrap().id);
    }

    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 24);
    assert_eq!(store.count().await.unwrap(), 24);
    assert_eq!(store.pool().unwrap().idle(), 4, "every connection released");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_initialize_on_shared_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let a = SqliteRecordStore::new(&config(&path, 2)).unwrap();
    let b = SqliteRecordStore::new(&config(&path, 2)).unwrap();

    let (ra, rb) = tokio::join!(a.initialize(), b.initialize());
    ra.unwrap();
    rb.unwrap();

    let record = a
        .insert(&Transcript::new("hello").unwrap(), &insight(1))
        .await
        .unwrap();
    assert_eq!(b.get(record.id).await.unwrap(), Some(record));
}

#[tokio::test]
async fn same_store_initialized_concurrently_shares_one_pool() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteRecordStore::new(&config(&dir.path().join("once.db"), 3)).unwrap();
    let (r1, r2, r3) = tokio::join!(store.initialize(), store.initialize(), store.initialize());
    r1.unwrap();
    r2.unwrap();
    r3.unwrap();
    assert_eq!(store.pool().unwrap().size(), 3);
}

#[tokio::test]
async fn rejected_write_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reject.db");
    let store = SqliteRecordStore::new(&config(&path, 2)).unwrap();
    store.initialize().await.unwrap();
    store
        .insert(&Transcript::new("first").unwrap(), &insight(0))
        .await
        .unwrap();

    {
        let side = rusqlite::Connection::open(&path).unwrap();
        side.execute_batch(
            "CREATE TRIGGER reject_inserts BEFORE INSERT ON call_records
             BEGIN SELECT RAISE(ABORT, 'writes disabled'); END;",
        )
        .unwrap();
    }

    let err = store
        .insert(&Transcript::new("second").unwrap(), &insight(1))
        .await
        .unwrap_err();
    match &err {
        CallsightError::Persistence { message, .. } => {
            assert!(message.contains("writes disabled"), "got: {message}")
        }
        other => panic!("expected persistence error, got {other:?}"),
    }
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.pool().unwrap().idle(), 2);
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("durable.db");

    let first = SqliteRecordStore::new(&config(&path, 1)).unwrap();
    first.initialize().await.unwrap();
    let record = first
        .insert(&Transcript::new("keep me").unwrap(), &insight(7))
        .await
        .unwrap();
    first.close().await.unwrap();

    let second = SqliteRecordStore::new(&config(&path, 1)).unwrap();
    second.initialize().await.unwrap();
    let loaded = second.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded.transcript, "keep me");
    assert_eq!(loaded.intent, "intent 7");

    let next = second
        .insert(&Transcript::new("after reopen").unwrap(), &insight(8))
        .await
        .unwrap();
    assert!(next.id > record.id);
}
