//! In-process store: an isolated Tokio task that owns every document.
//!
//! The store runs as an actor. Handles send commands through an mpsc
//! channel and wait for the reply on a oneshot channel. Because one task
//! processes commands in order, the revision check and the write of a
//! conditional commit can never interleave with another writer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossmark_protocol::Revision;
use futures_util::StreamExt;
use rand::Rng;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{Change, ChangeStream, Collection, Document, Storage, StoreError};

/// Sizing for a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Commands that may queue before callers wait (backpressure).
    pub command_buffer: usize,

    /// Changes buffered per collection feed. A subscriber that falls
    /// further behind than this sees [`StoreError::Lagged`].
    pub feed_capacity: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            command_buffer: 64,
            feed_capacity: 256,
        }
    }
}

/// Commands sent to the store actor.
enum StoreCommand {
    Get {
        collection: Collection,
        id: String,
        reply: oneshot::Sender<Result<Document, StoreError>>,
    },
    List {
        collection: Collection,
        reply: oneshot::Sender<Vec<Document>>,
    },
    Insert {
        collection: Collection,
        data: Vec<u8>,
        reply: oneshot::Sender<(String, Revision)>,
    },
    Commit {
        collection: Collection,
        id: String,
        data: Vec<u8>,
        expected: Revision,
        reply: oneshot::Sender<Result<Revision, StoreError>>,
    },
    Remove {
        collection: Collection,
        id: String,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Subscribe {
        collection: Collection,
        reply: oneshot::Sender<broadcast::Receiver<Change>>,
    },
}

/// Handle to an in-memory store actor.
///
/// Cheap to clone; every clone talks to the same documents. The actor
/// stops once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sender: mpsc::Sender<StoreCommand>,
    online: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Spawns a store with default sizing. Must be called inside a Tokio
    /// runtime.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Spawns a store with the given sizing.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
        let actor = StoreActor {
            collections: HashMap::new(),
            feed_capacity: config.feed_capacity.max(1),
            receiver: rx,
        };
        tokio::spawn(actor.run());

        Self {
            sender: tx,
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Takes the store offline (`false`) or back online (`true`).
    ///
    /// While offline every operation on every handle fails with
    /// [`StoreError::Unavailable`] without reaching the documents.
    pub fn set_available(&self, available: bool) {
        self.online.store(available, Ordering::SeqCst);
        tracing::info!(available, "memory store availability changed");
    }

    /// Deletes a document and publishes the removal to subscribers.
    ///
    /// Crossmark never deletes records itself; this stands in for
    /// external archival.
    pub async fn remove(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::Remove {
            collection,
            id: id.to_owned(),
            reply,
        })
        .await?
    }

    /// Sends a command and waits for its reply.
    async fn request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> StoreCommand,
    ) -> Result<R, StoreError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| StoreError::Unavailable("store actor stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| StoreError::Unavailable("store actor dropped the request".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        self.request(|reply| StoreCommand::Get {
            collection,
            id: id.to_owned(),
            reply,
        })
        .await?
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.request(|reply| StoreCommand::List { collection, reply })
            .await
    }

    async fn insert(
        &self,
        collection: Collection,
        data: Vec<u8>,
    ) -> Result<(String, Revision), StoreError> {
        self.request(|reply| StoreCommand::Insert {
            collection,
            data,
            reply,
        })
        .await
    }

    async fn conditional_commit(
        &self,
        collection: Collection,
        id: &str,
        data: Vec<u8>,
        expected: Revision,
    ) -> Result<Revision, StoreError> {
        self.request(|reply| StoreCommand::Commit {
            collection,
            id: id.to_owned(),
            data,
            expected,
            reply,
        })
        .await?
    }

    async fn subscribe(&self, collection: Collection) -> Result<ChangeStream, StoreError> {
        let rx = self
            .request(|reply| StoreCommand::Subscribe { collection, reply })
            .await?;
        Ok(change_stream(rx))
    }
}

/// Adapts a broadcast receiver into a [`ChangeStream`].
///
/// The stream ends when the store actor stops.
fn change_stream(rx: broadcast::Receiver<Change>) -> ChangeStream {
    futures_util::stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(change) => Some((Ok(change), rx)),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                Some((Err(StoreError::Lagged(missed)), rx))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    })
    .boxed()
}

/// Documents and change feed of one collection.
struct CollectionState {
    /// Keyed by id. A `BTreeMap` so listings come back in a stable order.
    docs: BTreeMap<String, (Revision, Vec<u8>)>,
    feed: broadcast::Sender<Change>,
}

/// The actor that owns all documents. Runs inside a Tokio task.
struct StoreActor {
    collections: HashMap<Collection, CollectionState>,
    feed_capacity: usize,
    receiver: mpsc::Receiver<StoreCommand>,
}

impl StoreActor {
    async fn run(mut self) {
        tracing::debug!("memory store started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                StoreCommand::Get {
                    collection,
                    id,
                    reply,
                } => {
                    let _ = reply.send(self.handle_get(collection, id));
                }
                StoreCommand::List { collection, reply } => {
                    let _ = reply.send(self.handle_list(collection));
                }
                StoreCommand::Insert {
                    collection,
                    data,
                    reply,
                } => {
                    let _ = reply.send(self.handle_insert(collection, data));
                }
                StoreCommand::Commit {
                    collection,
                    id,
                    data,
                    expected,
                    reply,
                } => {
                    let _ = reply.send(self.handle_commit(collection, id, data, expected));
                }
                StoreCommand::Remove {
                    collection,
                    id,
                    reply,
                } => {
                    let _ = reply.send(self.handle_remove(collection, id));
                }
                StoreCommand::Subscribe { collection, reply } => {
                    let _ = reply.send(self.collection(collection).feed.subscribe());
                }
            }
        }

        tracing::debug!("memory store stopped");
    }

    fn collection(&mut self, collection: Collection) -> &mut CollectionState {
        let capacity = self.feed_capacity;
        self.collections
            .entry(collection)
            .or_insert_with(|| CollectionState {
                docs: BTreeMap::new(),
                feed: broadcast::channel(capacity).0,
            })
    }

    fn handle_get(&mut self, collection: Collection, id: String) -> Result<Document, StoreError> {
        match self.collection(collection).docs.get(&id) {
            Some((revision, data)) => Ok(Document {
                revision: *revision,
                data: data.clone(),
                id,
            }),
            None => Err(StoreError::NotFound { collection, id }),
        }
    }

    fn handle_list(&mut self, collection: Collection) -> Vec<Document> {
        self.collection(collection)
            .docs
            .iter()
            .map(|(id, (revision, data))| Document {
                id: id.clone(),
                revision: *revision,
                data: data.clone(),
            })
            .collect()
    }

    fn handle_insert(&mut self, collection: Collection, data: Vec<u8>) -> (String, Revision) {
        let state = self.collection(collection);
        let id = loop {
            let candidate = generate_id();
            if !state.docs.contains_key(&candidate) {
                break candidate;
            }
        };

        let revision = Revision::INITIAL;
        state.docs.insert(id.clone(), (revision, data.clone()));
        publish(
            &state.feed,
            Change {
                collection,
                id: id.clone(),
                revision,
                data: Some(data),
            },
        );

        tracing::debug!(%collection, %id, "document inserted");
        (id, revision)
    }

    fn handle_commit(
        &mut self,
        collection: Collection,
        id: String,
        data: Vec<u8>,
        expected: Revision,
    ) -> Result<Revision, StoreError> {
        let state = self.collection(collection);
        let Some((current, stored)) = state.docs.get_mut(&id) else {
            return Err(StoreError::NotFound { collection, id });
        };

        if *current != expected {
            return Err(StoreError::Conflict {
                collection,
                actual: *current,
                id,
                expected,
            });
        }

        let revision = expected.next();
        *current = revision;
        *stored = data.clone();
        publish(
            &state.feed,
            Change {
                collection,
                id: id.clone(),
                revision,
                data: Some(data),
            },
        );

        tracing::debug!(%collection, %id, %revision, "document committed");
        Ok(revision)
    }

    fn handle_remove(&mut self, collection: Collection, id: String) -> Result<(), StoreError> {
        let state = self.collection(collection);
        let Some((revision, _)) = state.docs.remove(&id) else {
            return Err(StoreError::NotFound { collection, id });
        };
        publish(
            &state.feed,
            Change {
                collection,
                id: id.clone(),
                revision: revision.next(),
                data: None,
            },
        );

        tracing::debug!(%collection, %id, "document removed");
        Ok(())
    }
}

/// Publishes a change. Having no subscribers is not an error.
fn publish(feed: &broadcast::Sender<Change>, change: Change) {
    let _ = feed.send(change);
}

/// Generates a random 20-character lowercase hex id (80 bits).
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 10] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
