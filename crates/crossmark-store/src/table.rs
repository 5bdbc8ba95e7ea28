//! Typed view over one collection.

use std::fmt;
use std::marker::PhantomData;

use crossmark_protocol::{Codec, Revision, Versioned};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Change, Collection, Document, Storage, StoreError};

/// A decoded subscription entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange<K, T> {
    /// The record was inserted or committed.
    Upsert(Versioned<K, T>),
    /// The record was removed at `revision`.
    Removed { id: K, revision: Revision },
}

impl<K, T> TableChange<K, T> {
    pub fn id(&self) -> &K {
        match self {
            Self::Upsert(v) => &v.id,
            Self::Removed { id, .. } => id,
        }
    }

    pub fn revision(&self) -> Revision {
        match self {
            Self::Upsert(v) => v.revision,
            Self::Removed { revision, .. } => *revision,
        }
    }
}

/// Live, decoded feed of one collection.
pub type TableStream<K, T> = BoxStream<'static, Result<TableChange<K, T>, StoreError>>;

/// Reads and writes records of type `T`, keyed by `K`, in one collection.
///
/// `Table` is where bytes become records: it encodes with the codec on the
/// way in and decodes on the way out, so the layers above only see
/// [`Versioned`] snapshots.
pub struct Table<S, C, K, T> {
    store: S,
    codec: C,
    collection: Collection,
    _record: PhantomData<fn() -> (K, T)>,
}

impl<S: Clone, C: Clone, K, T> Clone for Table<S, C, K, T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            codec: self.codec.clone(),
            collection: self.collection,
            _record: PhantomData,
        }
    }
}

impl<S, C, K, T> fmt::Debug for Table<S, C, K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl<S, C, K, T> Table<S, C, K, T>
where
    S: Storage,
    C: Codec,
    K: From<String> + AsRef<str> + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(store: S, codec: C, collection: Collection) -> Self {
        Self {
            store,
            codec,
            collection,
            _record: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// The underlying untyped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads one record.
    pub async fn get(&self, id: &K) -> Result<Versioned<K, T>, StoreError> {
        let doc = self.store.get(self.collection, id.as_ref()).await?;
        self.decode(doc)
    }

    /// Reads every record in the collection.
    ///
    /// One undecodable document fails the whole listing; callers that
    /// must tolerate foreign documents should use the raw store.
    pub async fn list(&self) -> Result<Vec<Versioned<K, T>>, StoreError> {
        self.store
            .list(self.collection)
            .await?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    /// Reads every record that decodes, skipping the rest.
    ///
    /// Listings shared with other hosts may hold documents this build
    /// can't read; they are logged and left out rather than failing the
    /// whole read.
    pub async fn scan(&self) -> Result<Vec<Versioned<K, T>>, StoreError> {
        let docs = self.store.list(self.collection).await?;
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id.clone();
            match self.decode(doc) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection = %self.collection, %id, error = %e, "skipping undecodable document");
                }
            }
        }
        Ok(records)
    }

    /// Inserts a new record and returns its first snapshot.
    pub async fn insert(&self, record: T) -> Result<Versioned<K, T>, StoreError> {
        let data = self.codec.encode(&record)?;
        let (id, revision) = self.store.insert(self.collection, data).await?;
        Ok(Versioned {
            id: K::from(id),
            revision,
            record,
        })
    }

    /// Commits `record` on top of `expected`, returning the new snapshot.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] if the stored revision moved past
    /// `expected`.
    pub async fn commit(
        &self,
        id: &K,
        record: T,
        expected: Revision,
    ) -> Result<Versioned<K, T>, StoreError> {
        let data = self.codec.encode(&record)?;
        let revision = self
            .store
            .conditional_commit(self.collection, id.as_ref(), data, expected)
            .await?;
        Ok(Versioned {
            id: id.clone(),
            revision,
            record,
        })
    }

    /// Subscribes to decoded changes.
    ///
    /// A change that fails to decode is yielded as an error item; the
    /// feed keeps going after it.
    pub async fn subscribe(&self) -> Result<TableStream<K, T>, StoreError> {
        let codec = self.codec.clone();
        let feed = self.store.subscribe(self.collection).await?;
        Ok(feed
            .map(move |item| item.and_then(|change| decode_change(&codec, change)))
            .boxed())
    }

    fn decode(&self, doc: Document) -> Result<Versioned<K, T>, StoreError> {
        let record = self.codec.decode(&doc.data)?;
        Ok(Versioned {
            id: K::from(doc.id),
            revision: doc.revision,
            record,
        })
    }
}

fn decode_change<C, K, T>(codec: &C, change: Change) -> Result<TableChange<K, T>, StoreError>
where
    C: Codec,
    K: From<String>,
    T: DeserializeOwned,
{
    let id = K::from(change.id);
    match change.data {
        Some(data) => Ok(TableChange::Upsert(Versioned {
            id,
            revision: change.revision,
            record: codec.decode(&data)?,
        })),
        None => Ok(TableChange::Removed {
            id,
            revision: change.revision,
        }),
    }
}
