//! Error types for the arbiter.

use crossmark_game::RuleError;
use crossmark_protocol::{GameId, Revision};
use crossmark_store::StoreError;

/// Why a transition was not committed.
///
/// In every case the stored game is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ArbiterError {
    /// The rules rejected the intent.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The game moved past the revision the intent was computed from,
    /// either before the read or between the read and the commit.
    #[error("game {game_id} is at {actual}, intent was computed from {expected}")]
    Conflict {
        game_id: GameId,
        expected: Revision,
        actual: Revision,
    },

    /// No game with this id exists.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The stored snapshot cannot be trusted (undecodable, or it breaks
    /// a record invariant).
    #[error("game {game_id} is corrupt: {reason}")]
    Corrupt { game_id: GameId, reason: String },

    /// Storage failed (typically unavailable).
    #[error(transparent)]
    Store(StoreError),
}

impl ArbiterError {
    /// Maps a storage error for `game_id` onto the arbiter's vocabulary.
    pub(crate) fn from_store(game_id: &GameId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(game_id.clone()),
            StoreError::Conflict {
                expected, actual, ..
            } => Self::Conflict {
                game_id: game_id.clone(),
                expected,
                actual,
            },
            StoreError::Protocol(e) => Self::Corrupt {
                game_id: game_id.clone(),
                reason: e.to_string(),
            },
            other => Self::Store(other),
        }
    }
}
