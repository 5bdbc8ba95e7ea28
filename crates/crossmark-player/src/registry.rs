//! The player registry: creates, renames, and looks up players.

use crossmark_protocol::{Codec, JsonCodec, PlayerId};
use crossmark_store::{Collection, Storage, StoreError, Table};

use crate::{Player, PlayerError, PlayerSnapshot};

/// Manages player records in shared storage.
///
/// Player records are owned by their player: only the owner's host ever
/// writes one, so contention is rare. Writes still go through a
/// conditional commit so two devices sharing an identity can't silently
/// overwrite each other.
#[derive(Debug, Clone)]
pub struct PlayerRegistry<S, C = JsonCodec> {
    players: Table<S, C, PlayerId, Player>,
}

impl<S: Storage> PlayerRegistry<S, JsonCodec> {
    /// Creates a registry that stores records as JSON.
    pub fn new(store: S) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<S: Storage, C: Codec> PlayerRegistry<S, C> {
    pub fn with_codec(store: S, codec: C) -> Self {
        Self {
            players: Table::new(store, codec, Collection::Players),
        }
    }

    /// The typed `players` table, for subscribers.
    pub fn table(&self) -> &Table<S, C, PlayerId, Player> {
        &self.players
    }

    /// Registers a new player and returns the stored record with the id
    /// storage assigned.
    ///
    /// # Errors
    /// - [`PlayerError::InvalidName`] for a blank name
    /// - [`PlayerError::Store`] if storage fails
    pub async fn register(&self, name: &str) -> Result<PlayerSnapshot, PlayerError> {
        let player = Player::named(name)?;
        let snapshot = self.players.insert(player).await?;
        tracing::info!(player_id = %snapshot.id, name = %snapshot.record.name, "player registered");
        Ok(snapshot)
    }

    /// Changes a player's display name.
    ///
    /// # Errors
    /// - [`PlayerError::Unauthorized`] unless `actor == player_id`
    /// - [`PlayerError::InvalidName`] for a blank name
    /// - [`PlayerError::NotFound`] if the player does not exist
    /// - [`PlayerError::Conflict`] if the record changed mid-update
    pub async fn rename(
        &self,
        actor: &PlayerId,
        player_id: &PlayerId,
        name: &str,
    ) -> Result<PlayerSnapshot, PlayerError> {
        if actor != player_id {
            return Err(PlayerError::Unauthorized {
                actor: actor.clone(),
                target: player_id.clone(),
            });
        }
        let player = Player::named(name)?;
        let current = self.get(player_id).await?;

        let snapshot = self
            .players
            .commit(player_id, player, current.revision)
            .await
            .map_err(|e| match e {
                StoreError::Conflict { .. } => PlayerError::Conflict(player_id.clone()),
                StoreError::NotFound { .. } => PlayerError::NotFound(player_id.clone()),
                other => PlayerError::Store(other),
            })?;

        tracing::info!(%player_id, name = %snapshot.record.name, "player renamed");
        Ok(snapshot)
    }

    /// Looks up one player.
    ///
    /// # Errors
    /// [`PlayerError::NotFound`] if no such player is registered.
    pub async fn get(&self, player_id: &PlayerId) -> Result<PlayerSnapshot, PlayerError> {
        self.players.get(player_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => PlayerError::NotFound(player_id.clone()),
            other => PlayerError::Store(other),
        })
    }

    /// Returns `true` if a player with this id is registered.
    pub async fn exists(&self, player_id: &PlayerId) -> Result<bool, PlayerError> {
        match self.get(player_id).await {
            Ok(_) => Ok(true),
            Err(PlayerError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every registered player.
    pub async fn list(&self) -> Result<Vec<PlayerSnapshot>, PlayerError> {
        Ok(self.players.list().await?)
    }
}
