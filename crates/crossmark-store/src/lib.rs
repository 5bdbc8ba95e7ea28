//! Storage abstraction for Crossmark.
//!
//! Game and player records live in a shared, externally replicated store
//! that no single host owns. Crossmark only needs a narrow contract from
//! it, captured by the [`Storage`] trait:
//!
//! - point reads that return a [`Revision`] with the bytes,
//! - inserts that assign an id,
//! - a **conditional commit** (compare-and-set on the revision),
//! - a push feed of changes per collection.
//!
//! [`MemoryStore`] implements the contract in-process (tests, demos,
//! single-host deployments). [`Table`] layers typed records over any
//! `Storage` using a [`Codec`](crossmark_protocol::Codec).
//!
//! # How it fits in the stack
//!
//! ```text
//! Arbiter / Directory / Registry (above)  ← typed snapshots via Table
//!     ↕
//! Storage (this crate)                    ← bytes + revisions
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod table;

use std::fmt;
use std::future::Future;

use crossmark_protocol::Revision;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use error::StoreError;
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use table::{Table, TableChange, TableStream};

/// The collections Crossmark keeps records in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Players,
    Games,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Games => "games",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record as raw bytes plus its revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub revision: Revision,
    pub data: Vec<u8>,
}

/// One entry of a subscription feed.
///
/// `data` is `None` when the document was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub collection: Collection,
    pub id: String,
    pub revision: Revision,
    pub data: Option<Vec<u8>>,
}

/// Live feed of changes to one collection.
///
/// Infinite while the store is alive and not restartable. Revisions are
/// monotonic per document. `Err(StoreError::Lagged(n))` means the
/// subscriber fell behind and `n` changes were dropped; the subscriber
/// should re-list the collection.
pub type ChangeStream = BoxStream<'static, Result<Change, StoreError>>;

/// The storage collaborator Crossmark depends on.
///
/// Implementations are cheap handles (`Clone`) shared across tasks. Every
/// method may fail with [`StoreError::Unavailable`] when the backend
/// cannot be reached; that is the only error worth retrying unchanged.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Reads one document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if no document has that id.
    fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Reads every document currently in a collection.
    fn list(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Stores a new document and returns its assigned id and
    /// [`Revision::INITIAL`].
    fn insert(
        &self,
        collection: Collection,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<(String, Revision), StoreError>> + Send;

    /// Replaces a document only if its stored revision still equals
    /// `expected`, returning the new revision.
    ///
    /// The check and the write are one atomic step: of two commits made
    /// with the same `expected`, at most one lands.
    ///
    /// # Errors
    /// - [`StoreError::Conflict`] if another writer committed first
    /// - [`StoreError::NotFound`] if the document does not exist
    fn conditional_commit(
        &self,
        collection: Collection,
        id: &str,
        data: Vec<u8>,
        expected: Revision,
    ) -> impl Future<Output = Result<Revision, StoreError>> + Send;

    /// Subscribes to every later change in a collection.
    ///
    /// Changes committed before the call returns are not replayed; list
    /// the collection after subscribing to fill the gap.
    fn subscribe(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<ChangeStream, StoreError>> + Send;
}
