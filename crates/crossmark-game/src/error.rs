//! Error types for the game rules.

use crossmark_board::PlaceError;
use crossmark_protocol::PlayerId;

use crate::{Action, GameState};

/// Why an intent was rejected.
///
/// A rejected intent never produces a new record: the caller's snapshot
/// is exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The actor is not allowed to perform this transition (not a
    /// participant, or not the invited player for an accept).
    #[error("player {0} is not allowed to do that in this game")]
    Unauthorized(PlayerId),

    /// A participant moved while it was the other player's turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The target cell is occupied or off the board.
    #[error("illegal move: {0}")]
    IllegalMove(#[from] PlaceError),

    /// The game is already decided.
    #[error("game is over ({0})")]
    GameOver(GameState),

    /// A challenge was aimed at the challenger themself.
    #[error("player {0} cannot challenge themself")]
    InvalidTarget(PlayerId),

    /// The action has no edge out of the current (non-terminal) state,
    /// e.g. a move while still in `Invite`, or a second accept.
    #[error("cannot {action} while the game is in state {state}")]
    InvalidTransition { state: GameState, action: Action },

    /// The participant already signalled readiness.
    #[error("player {0} is already ready")]
    AlreadyReady(PlayerId),

    /// Moves are gated on both ready flags and at least one is unset.
    #[error("both players must be ready before moving")]
    NotReady,

    /// A stored snapshot breaks a record invariant.
    #[error("corrupt game record: {0}")]
    Corrupt(String),
}
