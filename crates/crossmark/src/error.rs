//! Unified error type for Crossmark.

use std::fmt;

use crossmark_arbiter::ArbiterError;
use crossmark_game::RuleError;
use crossmark_lobby::LobbyError;
use crossmark_player::PlayerError;
use crossmark_protocol::ProtocolError;
use crossmark_store::StoreError;

/// The closed set of failure kinds a caller reacts to.
///
/// Presentation code matches on this instead of on the nested error
/// types, which carry detail for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The actor may not perform this transition.
    Unauthorized,
    /// Moved while it was the other player's turn.
    NotYourTurn,
    /// Target cell occupied or off the board.
    IllegalMove,
    /// The game is already decided.
    GameOver,
    /// The record moved on; re-read before trying again.
    Conflict,
    /// Challenge aimed at self or at an unknown player.
    InvalidTarget,
    /// Storage could not complete the operation. Transient.
    StorageUnavailable,
    /// Unknown game or player id.
    NotFound,
    /// No such transition from the current state.
    InvalidState,
    /// A pending challenge between the same pair already exists.
    Duplicate,
    /// Malformed input, such as a blank name.
    InvalidInput,
    /// A stored record can't be decoded or breaks an invariant.
    Corrupt,
}

impl ErrorKind {
    /// Only storage outages are worth retrying as-is. Every other kind
    /// needs fresh input or a fresh snapshot first.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotYourTurn => "not_your_turn",
            Self::IllegalMove => "illegal_move",
            Self::GameOver => "game_over",
            Self::Conflict => "conflict",
            Self::InvalidTarget => "invalid_target",
            Self::StorageUnavailable => "storage_unavailable",
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::Duplicate => "duplicate",
            Self::InvalidInput => "invalid_input",
            Self::Corrupt => "corrupt",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CrossmarkError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Arbiter(#[from] ArbiterError),

    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

impl CrossmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(_) => ErrorKind::Corrupt,
            Self::Rule(e) => rule_kind(e),
            Self::Store(e) => store_kind(e),
            Self::Player(e) => player_kind(e),
            Self::Arbiter(e) => arbiter_kind(e),
            Self::Lobby(e) => match e {
                LobbyError::InvalidTarget(_) => ErrorKind::InvalidTarget,
                LobbyError::Duplicate { .. } => ErrorKind::Duplicate,
                LobbyError::Arbiter(e) => arbiter_kind(e),
                LobbyError::Player(e) => player_kind(e),
                LobbyError::Store(e) => store_kind(e),
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

fn rule_kind(e: &RuleError) -> ErrorKind {
    match e {
        RuleError::Unauthorized(_) => ErrorKind::Unauthorized,
        RuleError::NotYourTurn(_) => ErrorKind::NotYourTurn,
        RuleError::IllegalMove(_) => ErrorKind::IllegalMove,
        RuleError::GameOver(_) => ErrorKind::GameOver,
        RuleError::InvalidTarget(_) => ErrorKind::InvalidTarget,
        RuleError::InvalidTransition { .. } | RuleError::AlreadyReady(_) | RuleError::NotReady => {
            ErrorKind::InvalidState
        }
        RuleError::Corrupt(_) => ErrorKind::Corrupt,
    }
}

fn store_kind(e: &StoreError) -> ErrorKind {
    match e {
        // A lagged feed recovers by re-reading, like an outage.
        StoreError::Unavailable(_) | StoreError::Lagged(_) => ErrorKind::StorageUnavailable,
        StoreError::NotFound { .. } => ErrorKind::NotFound,
        StoreError::Conflict { .. } => ErrorKind::Conflict,
        StoreError::Protocol(_) => ErrorKind::Corrupt,
    }
}

fn player_kind(e: &PlayerError) -> ErrorKind {
    match e {
        PlayerError::InvalidName => ErrorKind::InvalidInput,
        PlayerError::Unauthorized { .. } => ErrorKind::Unauthorized,
        PlayerError::NotFound(_) => ErrorKind::NotFound,
        PlayerError::Conflict(_) => ErrorKind::Conflict,
        PlayerError::Store(e) => store_kind(e),
    }
}

fn arbiter_kind(e: &ArbiterError) -> ErrorKind {
    match e {
        ArbiterError::Rule(e) => rule_kind(e),
        ArbiterError::Conflict { .. } => ErrorKind::Conflict,
        ArbiterError::NotFound(_) => ErrorKind::NotFound,
        ArbiterError::Corrupt { .. } => ErrorKind::Corrupt,
        ArbiterError::Store(e) => store_kind(e),
    }
}
