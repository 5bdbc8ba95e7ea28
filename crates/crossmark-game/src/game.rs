//! The stored game record.

use crossmark_board::{Board, Mark, evaluate};
use crossmark_protocol::{GameId, PlayerId, Versioned};
use serde::{Deserialize, Serialize};

use crate::{GameState, RuleError};

/// A game record at one revision.
pub type GameSnapshot = Versioned<GameId, Game>;

/// Which side of the game a participant sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// The challenger. Plays mark `A` and moves first.
    Player1,
    /// The challenged player. Plays mark `B`.
    Player2,
}

impl Seat {
    /// The mark this seat places.
    pub fn mark(self) -> Mark {
        match self {
            Seat::Player1 => Mark::A,
            Seat::Player2 => Mark::B,
        }
    }
}

/// One two-player game session as stored in the `games` collection.
///
/// Field names on the wire follow the documents other hosts write
/// (`gameBoard`, `gameState`, `player1Id`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(rename = "gameBoard")]
    pub board: Board,
    #[serde(rename = "gameState")]
    pub state: GameState,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    #[serde(default)]
    pub player1_ready: bool,
    #[serde(default)]
    pub player2_ready: bool,
}

impl Game {
    /// A fresh game in [`GameState::Invite`], created by `challenger`.
    ///
    /// # Errors
    /// [`RuleError::InvalidTarget`] if a player challenges themself.
    pub fn challenge(challenger: PlayerId, target: PlayerId) -> Result<Self, RuleError> {
        if challenger == target {
            return Err(RuleError::InvalidTarget(target));
        }
        Ok(Self {
            board: Board::new(),
            state: GameState::Invite,
            player1_id: challenger,
            player2_id: target,
            player1_ready: false,
            player2_ready: false,
        })
    }

    /// The seat `player` occupies, or `None` for outsiders.
    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        if *player == self.player1_id {
            Some(Seat::Player1)
        } else if *player == self.player2_id {
            Some(Seat::Player2)
        } else {
            None
        }
    }

    /// The player sitting in `seat`.
    pub fn player(&self, seat: Seat) -> &PlayerId {
        match seat {
            Seat::Player1 => &self.player1_id,
            Seat::Player2 => &self.player2_id,
        }
    }

    /// Returns `true` if `player` is one of the two participants.
    pub fn involves(&self, player: &PlayerId) -> bool {
        self.seat_of(player).is_some()
    }

    /// The ready flag of `seat`.
    pub fn is_ready(&self, seat: Seat) -> bool {
        match seat {
            Seat::Player1 => self.player1_ready,
            Seat::Player2 => self.player2_ready,
        }
    }

    /// Returns `true` once both participants signalled readiness.
    pub fn both_ready(&self) -> bool {
        self.player1_ready && self.player2_ready
    }

    /// Checks the record invariants.
    ///
    /// Snapshots come from shared storage that any client can write to,
    /// so they are checked before a transition is computed on top of
    /// them:
    ///
    /// - the two participants differ;
    /// - the marks alternate with `A` first;
    /// - `Invite` has an empty board;
    /// - a turn state has no decided board and names the mark that is
    ///   actually due;
    /// - a terminal state matches what the board evaluates to.
    ///
    /// # Errors
    /// [`RuleError::Corrupt`] describing the first violation found.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.player1_id == self.player2_id {
            return Err(RuleError::Corrupt(format!(
                "player {} sits on both seats",
                self.player1_id
            )));
        }
        if !self.board.is_balanced() {
            return Err(RuleError::Corrupt(format!(
                "unbalanced marks (A={}, B={})",
                self.board.count(Mark::A),
                self.board.count(Mark::B)
            )));
        }

        let outcome = evaluate(&self.board);
        let consistent = match self.state {
            GameState::Invite => self.board.is_empty(),
            GameState::Player1Turn | GameState::Player2Turn => {
                !outcome.is_decided() && self.state.turn_mark() == Some(self.board.to_move())
            }
            terminal => GameState::from_outcome(outcome) == Some(terminal),
        };
        if !consistent {
            return Err(RuleError::Corrupt(format!(
                "state {} does not match board {:?}",
                self.state, outcome
            )));
        }
        Ok(())
    }
}
