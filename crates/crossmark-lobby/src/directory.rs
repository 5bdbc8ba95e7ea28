//! The session directory: creates challenges and maps players to games.

use crossmark_arbiter::Arbiter;
use crossmark_game::{Game, GameSnapshot, GameState, Intent, RuleError, Rules};
use crossmark_player::PlayerRegistry;
use crossmark_protocol::{Codec, GameId, JsonCodec, PlayerId, Revision};
use crossmark_store::Storage;

use crate::{DuplicatePolicy, LobbyConfig, LobbyError};

/// Entry point for matchmaking.
///
/// Like the [`Arbiter`] it wraps, a directory keeps no state between
/// calls; every listing is read fresh from storage.
#[derive(Debug, Clone)]
pub struct Directory<S, C = JsonCodec> {
    arbiter: Arbiter<S, C>,
    players: PlayerRegistry<S, C>,
    config: LobbyConfig,
}

impl<S: Storage> Directory<S, JsonCodec> {
    /// Creates a directory over `store` using JSON records.
    pub fn new(store: S, rules: Rules, config: LobbyConfig) -> Self {
        Self::from_parts(
            Arbiter::new(store.clone(), rules),
            PlayerRegistry::new(store),
            config,
        )
    }
}

impl<S: Storage, C: Codec> Directory<S, C> {
    pub fn from_parts(arbiter: Arbiter<S, C>, players: PlayerRegistry<S, C>, config: LobbyConfig) -> Self {
        Self {
            arbiter,
            players,
            config,
        }
    }

    pub fn arbiter(&self) -> &Arbiter<S, C> {
        &self.arbiter
    }

    pub fn players(&self) -> &PlayerRegistry<S, C> {
        &self.players
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Creates a game in `Invite` with `challenger` as player 1.
    ///
    /// # Errors
    /// - [`LobbyError::InvalidTarget`] if `challenger == target` or the
    ///   target is not a registered player
    /// - [`LobbyError::Duplicate`] if the policy is
    ///   [`DuplicatePolicy::Reject`] and the pair already has a pending
    ///   challenge
    /// - [`LobbyError::Player`] / [`LobbyError::Store`] /
    ///   [`LobbyError::Arbiter`] if storage fails
    pub async fn create_challenge(
        &self,
        challenger: &PlayerId,
        target: &PlayerId,
    ) -> Result<GameSnapshot, LobbyError> {
        let game = Game::challenge(challenger.clone(), target.clone()).map_err(|e| match e {
            RuleError::InvalidTarget(p) => LobbyError::InvalidTarget(p),
            other => LobbyError::Arbiter(other.into()),
        })?;

        if !self.players.exists(target).await? {
            tracing::debug!(%challenger, %target, "challenge to unknown player");
            return Err(LobbyError::InvalidTarget(target.clone()));
        }

        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            if let Some(existing) = self.pending_between(challenger, target).await? {
                tracing::debug!(%challenger, %target, game_id = %existing, "duplicate challenge refused");
                return Err(LobbyError::Duplicate {
                    challenger: challenger.clone(),
                    target: target.clone(),
                    existing,
                });
            }
        }

        Ok(self.arbiter.create(game).await?)
    }

    /// Every game `player` takes part in, as of this call.
    ///
    /// The iterator is a one-shot view: call again for a fresh one.
    /// Records that fail validation are left out.
    pub async fn list_visible_sessions(
        &self,
        player: &PlayerId,
    ) -> Result<std::vec::IntoIter<GameSnapshot>, LobbyError> {
        let games = self.valid_games().await?;
        Ok(games
            .into_iter()
            .filter(|g| g.record.involves(player))
            .collect::<Vec<_>>()
            .into_iter())
    }

    /// Pending challenges addressed to `player`.
    pub async fn incoming_challenges(&self, player: &PlayerId) -> Result<Vec<GameSnapshot>, LobbyError> {
        let games = self.valid_games().await?;
        Ok(games
            .into_iter()
            .filter(|g| g.record.state == GameState::Invite && g.record.player2_id == *player)
            .collect())
    }

    /// Accepts a challenge on behalf of `actor`.
    ///
    /// Goes through the arbiter like any other transition, so only the
    /// challenged player can accept, and only from `expected`.
    pub async fn accept_challenge(
        &self,
        game_id: &GameId,
        actor: &PlayerId,
        expected: Revision,
    ) -> Result<GameSnapshot, LobbyError> {
        Ok(self
            .arbiter
            .apply(game_id, &Intent::accept(actor.clone()), expected)
            .await?)
    }

    async fn pending_between(
        &self,
        challenger: &PlayerId,
        target: &PlayerId,
    ) -> Result<Option<GameId>, LobbyError> {
        let games = self.valid_games().await?;
        Ok(games
            .into_iter()
            .find(|g| {
                g.record.state == GameState::Invite
                    && g.record.player1_id == *challenger
                    && g.record.player2_id == *target
            })
            .map(|g| g.id))
    }

    async fn valid_games(&self) -> Result<Vec<GameSnapshot>, LobbyError> {
        let games = self.arbiter.table().scan().await?;
        Ok(games
            .into_iter()
            .filter(|g| match g.record.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(game_id = %g.id, reason = %e, "hiding corrupt game");
                    false
                }
            })
            .collect())
    }
}
