//! Error types for player management.

use crossmark_protocol::PlayerId;
use crossmark_store::StoreError;

/// Errors that can occur while registering, renaming, or looking up
/// players.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The display name is empty after trimming whitespace.
    #[error("player name must not be empty")]
    InvalidName,

    /// Somebody other than the owner tried to change a player record.
    #[error("player {actor} may not modify player {target}")]
    Unauthorized { actor: PlayerId, target: PlayerId },

    /// No player with this id is registered.
    #[error("player {0} not found")]
    NotFound(PlayerId),

    /// The record changed between the read and the write.
    #[error("player {0} was modified concurrently")]
    Conflict(PlayerId),

    /// Storage failed for another reason.
    #[error(transparent)]
    Store(#[from] StoreError),
}
