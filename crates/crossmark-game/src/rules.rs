//! Transition rules: validate an intent and compute the next record.

use crossmark_board::evaluate;
use serde::{Deserialize, Serialize};

use crate::{Action, Game, GameState, Intent, RuleError, Seat};

/// Rule settings for a deployment.
///
/// All hosts talking to the same storage must agree on these, otherwise
/// one host would accept moves another considers illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// When `true`, moves are rejected with [`RuleError::NotReady`] until
    /// both participants have sent [`Action::Ready`]. Off by default:
    /// readiness is then recorded but gates nothing.
    pub require_ready: bool,
}

impl Rules {
    /// Computes the record that results from `intent`.
    ///
    /// Pure: `game` is only borrowed and a rejected intent leaves no trace.
    ///
    /// # Errors
    /// Any [`RuleError`] except `InvalidTarget` and `Corrupt`.
    pub fn apply(&self, game: &Game, intent: &Intent) -> Result<Game, RuleError> {
        if game.state.is_terminal() {
            return Err(RuleError::GameOver(game.state));
        }
        match intent.action {
            Action::Accept => accept(game, intent),
            Action::Move { cell } => self.play(game, intent, cell),
            Action::Ready => ready(game, intent),
        }
    }

    fn play(&self, game: &Game, intent: &Intent, cell: usize) -> Result<Game, RuleError> {
        let actor = game
            .seat_of(&intent.actor)
            .ok_or_else(|| RuleError::Unauthorized(intent.actor.clone()))?;

        let Some(turn) = game.state.turn() else {
            return Err(RuleError::InvalidTransition {
                state: game.state,
                action: intent.action,
            });
        };
        if self.require_ready && !game.both_ready() {
            return Err(RuleError::NotReady);
        }

        // Occupancy is checked before turn order: a move onto a taken cell
        // is illegal whoever sends it.
        let board = game.board.place(cell, turn.mark())?;
        if actor != turn {
            return Err(RuleError::NotYourTurn(intent.actor.clone()));
        }

        Ok(Game {
            board,
            state: GameState::after_move(turn, evaluate(&board)),
            ..game.clone()
        })
    }
}

fn accept(game: &Game, intent: &Intent) -> Result<Game, RuleError> {
    if intent.actor != game.player2_id {
        return Err(RuleError::Unauthorized(intent.actor.clone()));
    }
    if game.state != GameState::Invite {
        return Err(RuleError::InvalidTransition {
            state: game.state,
            action: intent.action,
        });
    }
    Ok(Game {
        state: GameState::Player1Turn,
        ..game.clone()
    })
}

fn ready(game: &Game, intent: &Intent) -> Result<Game, RuleError> {
    let seat = game
        .seat_of(&intent.actor)
        .ok_or_else(|| RuleError::Unauthorized(intent.actor.clone()))?;
    if game.is_ready(seat) {
        return Err(RuleError::AlreadyReady(intent.actor.clone()));
    }

    let mut next = game.clone();
    match seat {
        Seat::Player1 => next.player1_ready = true,
        Seat::Player2 => next.player2_ready = true,
    }
    Ok(next)
}
