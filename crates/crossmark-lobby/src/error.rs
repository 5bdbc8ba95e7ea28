//! Error types for the lobby.

use crossmark_arbiter::ArbiterError;
use crossmark_player::PlayerError;
use crossmark_protocol::{GameId, PlayerId};
use crossmark_store::StoreError;

/// Errors that can occur during lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The target can't be challenged: it is the challenger, or no such
    /// player is registered.
    #[error("player {0} cannot be challenged")]
    InvalidTarget(PlayerId),

    /// A pending challenge between the same pair already exists.
    #[error("{challenger} already challenged {target} in game {existing}")]
    Duplicate {
        challenger: PlayerId,
        target: PlayerId,
        existing: GameId,
    },

    #[error(transparent)]
    Arbiter(#[from] ArbiterError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
