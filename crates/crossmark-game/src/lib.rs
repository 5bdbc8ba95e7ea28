//! Game session state machine for Crossmark.
//!
//! A game is a shared record that moves through a closed set of states:
//!
//! ```text
//!            accept (player 2)
//! Invite ───────────────────────→ Player1Turn ⇄ Player2Turn
//!                                      │             │
//!                                      ▼             ▼
//!                          Player1Won / Player2Won / Draw   (terminal)
//! ```
//!
//! Everything in this crate is a pure function from one snapshot to the
//! next. Nothing here reads or writes storage; committing a transition is
//! the arbiter's job.
//!
//! # Key types
//!
//! - [`Game`] — the stored record (board, state, participants, ready flags)
//! - [`GameState`] — the state machine's states
//! - [`Intent`] / [`Action`] — what a participant is trying to do
//! - [`Rules`] — validates an intent and computes the next record
//! - [`RuleError`] — why an intent was rejected

mod error;
mod game;
mod intent;
mod rules;
mod state;

pub use error::RuleError;
pub use game::{Game, GameSnapshot, Seat};
pub use intent::{Action, Intent};
pub use rules::Rules;
pub use state::GameState;
