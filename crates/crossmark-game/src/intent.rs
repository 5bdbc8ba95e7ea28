//! Intents: what a participant asks the state machine to do.

use std::fmt;

use crossmark_protocol::PlayerId;
use serde::{Deserialize, Serialize};

/// A single transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Player 2 accepts the challenge.
    Accept,
    /// Place the actor's mark on `cell` (`0..9`, row-major).
    Move { cell: usize },
    /// Set the actor's ready flag.
    Ready,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Move { cell } => write!(f, "move to cell {cell}"),
            Self::Ready => f.write_str("ready"),
        }
    }
}

/// An action together with the player performing it.
///
/// The actor is whatever identity the host bootstrapped for the local
/// device; the rules only compare it against the game's participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    pub actor: PlayerId,
    pub action: Action,
}

impl Intent {
    pub fn new(actor: PlayerId, action: Action) -> Self {
        Self { actor, action }
    }

    pub fn accept(actor: PlayerId) -> Self {
        Self::new(actor, Action::Accept)
    }

    pub fn play(actor: PlayerId, cell: usize) -> Self {
        Self::new(actor, Action::Move { cell })
    }

    pub fn ready(actor: PlayerId) -> Self {
        Self::new(actor, Action::Ready)
    }
}
