//! Integration tests for the in-memory store and the typed table layer.

use crossmark_protocol::{GameId, JsonCodec, Revision};
use crossmark_store::{
    Collection, MemoryStore, MemoryStoreConfig, Storage, StoreError, Table, TableChange,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Note {
    text: String,
}

fn note(text: &str) -> Note {
    Note { text: text.into() }
}

fn notes(store: &MemoryStore) -> Table<MemoryStore, JsonCodec, GameId, Note> {
    Table::new(store.clone(), JsonCodec, Collection::Games)
}

// =========================================================================
// Raw storage contract
// =========================================================================

#[tokio::test]
async fn test_insert_assigns_initial_revision_and_unique_ids() {
    let store = MemoryStore::new();

    let (a, rev_a) = store.insert(Collection::Games, b"a".to_vec()).await.unwrap();
    let (b, rev_b) = store.insert(Collection::Games, b"b".to_vec()).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(rev_a, Revision::INITIAL);
    assert_eq!(rev_b, Revision::INITIAL);
}

#[tokio::test]
async fn test_get_returns_latest_bytes_and_revision() {
    let store = MemoryStore::new();
    let (id, rev) = store.insert(Collection::Games, b"v1".to_vec()).await.unwrap();
    store
        .conditional_commit(Collection::Games, &id, b"v2".to_vec(), rev)
        .await
        .unwrap();

    let doc = store.get(Collection::Games, &id).await.unwrap();

    assert_eq!(doc.data, b"v2");
    assert_eq!(doc.revision, Revision(2));
}

#[tokio::test]
async fn test_get_unknown_id_returns_not_found() {
    let store = MemoryStore::new();
    let result = store.get(Collection::Players, "ghost").await;
    assert!(matches!(
        result,
        Err(StoreError::NotFound { collection: Collection::Players, .. })
    ));
}

#[tokio::test]
async fn test_collections_are_independent() {
    let store = MemoryStore::new();
    let (id, _) = store.insert(Collection::Players, b"p".to_vec()).await.unwrap();

    assert!(store.get(Collection::Games, &id).await.is_err());
    assert_eq!(store.list(Collection::Games).await.unwrap().len(), 0);
    assert_eq!(store.list(Collection::Players).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_conditional_commit_stale_revision_returns_conflict() {
    let store = MemoryStore::new();
    let (id, rev) = store.insert(Collection::Games, b"v1".to_vec()).await.unwrap();
    store
        .conditional_commit(Collection::Games, &id, b"v2".to_vec(), rev)
        .await
        .unwrap();

    let result = store
        .conditional_commit(Collection::Games, &id, b"stale".to_vec(), rev)
        .await;

    match result {
        Err(StoreError::Conflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, Revision(1));
            assert_eq!(actual, Revision(2));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    let doc = store.get(Collection::Games, &id).await.unwrap();
    assert_eq!(doc.data, b"v2", "losing write must not land");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_from_same_revision_exactly_one_lands() {
    let store = MemoryStore::new();
    let (id, rev) = store.insert(Collection::Games, b"base".to_vec()).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..16u8 {
        let store = store.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            store
                .conditional_commit(Collection::Games, &id, vec![i], rev)
                .await
        }));
    }

    let mut landed = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(new_rev) => {
                assert_eq!(new_rev, Revision(2));
                landed += 1;
            }
            Err(StoreError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(landed, 1);
    assert_eq!(conflicts, 15);
}

#[tokio::test]
async fn test_subscribe_delivers_inserts_and_commits_in_order() {
    let store = MemoryStore::new();
    let mut feed = store.subscribe(Collection::Games).await.unwrap();

    let (id, rev) = store.insert(Collection::Games, b"v1".to_vec()).await.unwrap();
    store
        .conditional_commit(Collection::Games, &id, b"v2".to_vec(), rev)
        .await
        .unwrap();

    let first = feed.next().await.unwrap().unwrap();
    let second = feed.next().await.unwrap().unwrap();
    assert_eq!(first.id, id);
    assert_eq!(first.revision, Revision(1));
    assert_eq!(second.revision, Revision(2));
    assert_eq!(second.data.as_deref(), Some(&b"v2"[..]));
}

#[tokio::test]
async fn test_subscribe_ignores_other_collections() {
    let store = MemoryStore::new();
    let mut feed = store.subscribe(Collection::Players).await.unwrap();

    store.insert(Collection::Games, b"g".to_vec()).await.unwrap();
    let (pid, _) = store.insert(Collection::Players, b"p".to_vec()).await.unwrap();

    let change = feed.next().await.unwrap().unwrap();
    assert_eq!(change.collection, Collection::Players);
    assert_eq!(change.id, pid);
}

#[tokio::test]
async fn test_slow_subscriber_sees_lagged() {
    let store = MemoryStore::with_config(MemoryStoreConfig {
        feed_capacity: 2,
        ..MemoryStoreConfig::default()
    });
    let mut feed = store.subscribe(Collection::Games).await.unwrap();

    for i in 0..5u8 {
        store.insert(Collection::Games, vec![i]).await.unwrap();
    }

    assert!(matches!(
        feed.next().await.unwrap(),
        Err(StoreError::Lagged(3))
    ));
    // The feed keeps going after a lag.
    assert!(feed.next().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_remove_publishes_tombstone() {
    let store = MemoryStore::new();
    let (id, _) = store.insert(Collection::Games, b"v1".to_vec()).await.unwrap();
    let mut feed = store.subscribe(Collection::Games).await.unwrap();

    store.remove(Collection::Games, &id).await.unwrap();

    let change = feed.next().await.unwrap().unwrap();
    assert_eq!(change.id, id);
    assert_eq!(change.data, None);
    assert_eq!(change.revision, Revision(2));
    assert!(store.get(Collection::Games, &id).await.is_err());
}

// =========================================================================
// Typed table
// =========================================================================

#[tokio::test]
async fn test_table_insert_then_get_returns_same_record() {
    let store = MemoryStore::new();
    let table = notes(&store);

    let inserted = table.insert(note("hello")).await.unwrap();
    let loaded = table.get(&inserted.id).await.unwrap();

    assert_eq!(loaded, inserted);
}

#[tokio::test]
async fn test_table_commit_advances_revision() {
    let store = MemoryStore::new();
    let table = notes(&store);
    let v1 = table.insert(note("one")).await.unwrap();

    let v2 = table.commit(&v1.id, note("two"), v1.revision).await.unwrap();

    assert_eq!(v2.revision, v1.revision.next());
    assert_eq!(table.get(&v1.id).await.unwrap().record, note("two"));
    assert!(matches!(
        table.commit(&v1.id, note("three"), v1.revision).await,
        Err(StoreError::Conflict { .. })
    ));
}

#[tokio::test]
async fn test_table_get_foreign_document_returns_protocol_error() {
    let store = MemoryStore::new();
    let (id, _) = store.insert(Collection::Games, b"not json".to_vec()).await.unwrap();

    let result = notes(&store).get(&GameId::from(id)).await;

    assert!(matches!(result, Err(StoreError::Protocol(_))));
}

#[tokio::test]
async fn test_table_scan_skips_foreign_documents() {
    let store = MemoryStore::new();
    let table = notes(&store);
    let kept = table.insert(note("readable")).await.unwrap();
    store.insert(Collection::Games, b"not json".to_vec()).await.unwrap();

    assert!(table.list().await.is_err());
    assert_eq!(table.scan().await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn test_table_subscribe_decodes_changes() {
    let store = MemoryStore::new();
    let table = notes(&store);
    let mut feed = table.subscribe().await.unwrap();

    let inserted = table.insert(note("hi")).await.unwrap();

    match feed.next().await.unwrap().unwrap() {
        TableChange::Upsert(snapshot) => assert_eq!(snapshot, inserted),
        other => panic!("expected upsert, got {other:?}"),
    }
}
