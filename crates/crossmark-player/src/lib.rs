//! Player records for Crossmark.
//!
//! A player is an opaque id plus a display name. How a device obtains its
//! id is outside Crossmark; this crate only stores the records and
//! enforces that a name is changed by its owner alone.
//!
//! ```text
//! register(name) ──→ [Player { name }] ──rename(by owner)──→ [Player { name' }]
//! ```

mod error;
mod player;
mod registry;

pub use error::PlayerError;
pub use player::{Player, PlayerSnapshot};
pub use registry::PlayerRegistry;
