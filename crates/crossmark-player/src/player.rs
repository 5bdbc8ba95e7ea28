//! The stored player record.

use crossmark_protocol::{PlayerId, Versioned};
use serde::{Deserialize, Serialize};

use crate::PlayerError;

/// A player record at one revision.
pub type PlayerSnapshot = Versioned<PlayerId, Player>;

/// A player as stored in the `players` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
}

impl Player {
    /// Builds a record from a user-supplied name.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// [`PlayerError::InvalidName`] if nothing is left after trimming.
    pub fn named(name: &str) -> Result<Self, PlayerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlayerError::InvalidName);
        }
        Ok(Self {
            name: name.to_owned(),
        })
    }
}
