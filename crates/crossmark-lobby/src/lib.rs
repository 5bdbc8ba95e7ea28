//! Session directory for Crossmark.
//!
//! Turns challenge and accept actions into games, and answers "which
//! games can this player see?" from the shared `games` collection.
//!
//! # Key types
//!
//! - [`Directory`] creates challenges and lists a player's games
//! - [`LobbyConfig`] settings, including the [`DuplicatePolicy`]
//! - [`LobbyError`] why a lobby operation failed

mod config;
mod directory;
mod error;

pub use config::{DuplicatePolicy, LobbyConfig};
pub use directory::Directory;
pub use error::LobbyError;
