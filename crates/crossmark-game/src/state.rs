//! The game state machine's states.

use std::fmt;

use crossmark_board::{Mark, Outcome};
use serde::{Deserialize, Serialize};

use crate::Seat;

/// Lifecycle state of a game.
///
/// - **Invite**: player 1 challenged player 2, who has not accepted yet.
/// - **Player1Turn** / **Player2Turn**: play is running; the named player
///   owns the next move.
/// - **Player1Won** / **Player2Won** / **Draw**: terminal. No transition
///   leaves a terminal state.
///
/// Stored as the snake_case strings other hosts already use
/// (`"invite"`, `"player1_turn"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Invite,
    Player1Turn,
    Player2Turn,
    Player1Won,
    Player2Won,
    Draw,
}

impl GameState {
    /// Returns `true` once the game is decided.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Player1Won | Self::Player2Won | Self::Draw)
    }

    /// Returns `true` while moves are being played.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Player1Turn | Self::Player2Turn)
    }

    /// The seat whose move it is, if play is running.
    pub fn turn(self) -> Option<Seat> {
        match self {
            Self::Player1Turn => Some(Seat::Player1),
            Self::Player2Turn => Some(Seat::Player2),
            _ => None,
        }
    }

    /// The state after `seat` moved and the board evaluated to `outcome`.
    pub(crate) fn after_move(seat: Seat, outcome: Outcome) -> Self {
        match outcome {
            Outcome::WinnerA => Self::Player1Won,
            Outcome::WinnerB => Self::Player2Won,
            Outcome::Draw => Self::Draw,
            Outcome::Undecided => match seat {
                Seat::Player1 => Self::Player2Turn,
                Seat::Player2 => Self::Player1Turn,
            },
        }
    }

    /// The terminal state matching a decided outcome.
    pub(crate) fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::WinnerA => Some(Self::Player1Won),
            Outcome::WinnerB => Some(Self::Player2Won),
            Outcome::Draw => Some(Self::Draw),
            Outcome::Undecided => None,
        }
    }

    /// The mark expected on the board for the seat to move.
    pub(crate) fn turn_mark(self) -> Option<Mark> {
        self.turn().map(Seat::mark)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invite => "invite",
            Self::Player1Turn => "player1_turn",
            Self::Player2Turn => "player2_turn",
            Self::Player1Won => "player1_won",
            Self::Player2Won => "player2_won",
            Self::Draw => "draw",
        };
        f.write_str(name)
    }
}
