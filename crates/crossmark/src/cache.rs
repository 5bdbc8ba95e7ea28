//! Subscription-fed caches of stored records.
//!
//! Each collection gets a `watch` channel holding an id → snapshot map.
//! A pump task applies changes from the storage feed; a change only
//! lands if its revision is newer than the cached one, so the cache
//! never moves backwards even when the feed and a direct read race.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crossmark_protocol::{Codec, Revision, Versioned};
use crossmark_store::{Storage, StoreError, Table, TableChange, TableStream};
use futures_util::StreamExt;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;

use crate::{CrossmarkError, RetryPolicy};

pub(crate) type Snapshots<K, T> = BTreeMap<K, Versioned<K, T>>;
pub(crate) type Cache<K, T> = Arc<watch::Sender<Snapshots<K, T>>>;

/// Inserts `snapshot` unless the cache already holds the same or a newer
/// revision. Returns whether the map changed.
pub(crate) fn merge<K: Ord + Clone, T>(map: &mut Snapshots<K, T>, snapshot: Versioned<K, T>) -> bool {
    if map
        .get(&snapshot.id)
        .is_some_and(|cached| cached.revision >= snapshot.revision)
    {
        return false;
    }
    map.insert(snapshot.id.clone(), snapshot);
    true
}

/// Drops `id` if the cached copy is older than the removal.
pub(crate) fn evict<K: Ord, T>(map: &mut Snapshots<K, T>, id: &K, revision: Revision) -> bool {
    if map.get(id).is_some_and(|cached| cached.revision < revision) {
        map.remove(id);
        return true;
    }
    false
}

/// Subscribes to `table` and fills a new cache from a full read.
///
/// The subscription is opened first so a change committed during the
/// read still arrives on the feed.
pub(crate) async fn seed<S, C, K, T>(
    table: &Table<S, C, K, T>,
    retry: &RetryPolicy,
) -> Result<(Cache<K, T>, TableStream<K, T>), CrossmarkError>
where
    S: Storage,
    C: Codec,
    K: From<String> + AsRef<str> + Ord + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let feed = retry
        .run(|| async move { table.subscribe().await.map_err(CrossmarkError::from) })
        .await?;
    let records = retry
        .run(|| async move { table.scan().await.map_err(CrossmarkError::from) })
        .await?;

    let mut map = BTreeMap::new();
    for record in records {
        merge(&mut map, record);
    }
    let (sender, _) = watch::channel(map);
    Ok((Arc::new(sender), feed))
}

/// Applies the feed to the cache until the feed ends.
pub(crate) async fn pump<S, C, K, T>(
    table: Table<S, C, K, T>,
    mut feed: TableStream<K, T>,
    cache: Cache<K, T>,
    resync_on_lag: bool,
    retry: RetryPolicy,
) where
    S: Storage,
    C: Codec,
    K: From<String> + AsRef<str> + Ord + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let collection = table.collection();
    while let Some(item) = feed.next().await {
        match item {
            Ok(TableChange::Upsert(snapshot)) => {
                cache.send_if_modified(|map| merge(map, snapshot));
            }
            Ok(TableChange::Removed { id, revision }) => {
                cache.send_if_modified(|map| evict(map, &id, revision));
            }
            Err(StoreError::Lagged(missed)) => {
                tracing::warn!(%collection, missed, "cache subscription lagged");
                if resync_on_lag {
                    if let Err(e) = resync(&table, &cache, &retry).await {
                        tracing::warn!(%collection, error = %e, "cache resync failed");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%collection, error = %e, "skipping unreadable change");
            }
        }
    }
    tracing::debug!(%collection, "cache subscription closed");
}

/// Re-reads the whole collection into the cache.
///
/// Records missing from the listing are dropped; everything else goes
/// through [`merge`], so a newer copy already in the cache wins.
pub(crate) async fn resync<S, C, K, T>(
    table: &Table<S, C, K, T>,
    cache: &Cache<K, T>,
    retry: &RetryPolicy,
) -> Result<(), CrossmarkError>
where
    S: Storage,
    C: Codec,
    K: From<String> + AsRef<str> + Ord + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let records = retry
        .run(|| async move { table.scan().await.map_err(CrossmarkError::from) })
        .await?;
    let listed: BTreeSet<K> = records.iter().map(|r| r.id.clone()).collect();

    cache.send_if_modified(|map| {
        let before = map.len();
        map.retain(|id, _| listed.contains(id));
        let mut changed = map.len() != before;
        for record in records {
            changed |= merge(map, record);
        }
        changed
    });
    tracing::debug!(collection = %table.collection(), records = listed.len(), "cache resynced");
    Ok(())
}
