//! # Crossmark
//!
//! Two-player turn-based game coordinator over shared, replicated
//! storage.
//!
//! Game records live in storage that no host owns. Every change goes
//! through the [`Arbiter`](crossmark_arbiter::Arbiter), which commits a
//! transition only if the game is still at the revision the intent was
//! computed from. Each host runs a [`Coordinator`] that keeps a
//! read-only cache of games and players current from the storage feed
//! and submits the local player's intents.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crossmark::prelude::*;
//!
//! # async fn demo() -> Result<(), CrossmarkError> {
//! let store = MemoryStore::new();
//! let ada = Coordinator::builder().register(store.clone(), "Ada").await?;
//! let bob = Coordinator::builder().register(store, "Bob").await?;
//!
//! let invite = ada.submit_challenge(bob.player_id()).await?;
//! bob.submit_accept(&invite.id).await?;
//! ada.submit_move(&invite.id, 4).await?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod coordinator;
mod error;
pub mod logging;
mod retry;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorBuilder, GameMap, PlayerMap};
pub use error::{CrossmarkError, ErrorKind};
pub use retry::RetryPolicy;

pub use crossmark_arbiter as arbiter;
pub use crossmark_board as board;
pub use crossmark_game as game;
pub use crossmark_lobby as lobby;
pub use crossmark_player as player;
pub use crossmark_protocol as protocol;
pub use crossmark_store as store;

/// Everything a host needs to drive games.
pub mod prelude {
    pub use crate::{Coordinator, CoordinatorBuilder, CoordinatorConfig, CrossmarkError, ErrorKind, RetryPolicy};
    pub use crossmark_board::{Board, Cell, Mark, Outcome, evaluate};
    pub use crossmark_game::{Action, Game, GameSnapshot, GameState, Intent, Rules, Seat};
    pub use crossmark_lobby::{DuplicatePolicy, LobbyConfig};
    pub use crossmark_player::{Player, PlayerSnapshot};
    pub use crossmark_protocol::{GameId, PlayerId, Revision};
    pub use crossmark_store::{MemoryStore, Storage};
}
