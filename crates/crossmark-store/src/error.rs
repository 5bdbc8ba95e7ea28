//! Error types for the storage layer.

use crossmark_protocol::{ProtocolError, Revision};

use crate::Collection;

/// Errors that can occur while talking to storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not complete the operation. Transient: the same
    /// call may succeed later.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// No document with this id exists in the collection.
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    /// A conditional commit lost the race: the stored revision is no
    /// longer the one the write was computed from.
    #[error("{collection}/{id} is at {actual}, expected {expected}")]
    Conflict {
        collection: Collection,
        id: String,
        expected: Revision,
        actual: Revision,
    },

    /// A subscriber fell behind and missed this many changes.
    #[error("subscription lagged, {0} changes dropped")]
    Lagged(u64),

    /// A document could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
