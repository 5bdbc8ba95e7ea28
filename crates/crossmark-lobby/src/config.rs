//! Lobby configuration.

use serde::{Deserialize, Serialize};

/// What to do when a player challenges someone they already have a
/// pending challenge with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse a second `Invite` for the same (challenger, target) pair.
    ///
    /// The check reads the current listing, so two hosts racing to
    /// create the same challenge can still both succeed.
    #[default]
    Reject,
    /// Create every challenge as asked.
    Allow,
}

/// Settings for a [`Directory`](crate::Directory).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LobbyConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}
