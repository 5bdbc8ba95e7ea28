//! The arbiter: read, validate, compute, conditionally commit.

use crossmark_game::{Game, GameSnapshot, Intent, RuleError, Rules};
use crossmark_protocol::{Codec, GameId, JsonCodec, Revision};
use crossmark_store::{Collection, Storage, Table};

use crate::ArbiterError;

/// Serializes transitions of game records in shared storage.
///
/// Holds no game state of its own: every call works on the single
/// snapshot it reads, so any number of arbiters on any number of hosts
/// can run against the same store.
#[derive(Debug, Clone)]
pub struct Arbiter<S, C = JsonCodec> {
    games: Table<S, C, GameId, Game>,
    rules: Rules,
}

impl<S: Storage> Arbiter<S, JsonCodec> {
    pub fn new(store: S, rules: Rules) -> Self {
        Self::with_codec(store, JsonCodec, rules)
    }
}

impl<S: Storage, C: Codec> Arbiter<S, C> {
    pub fn with_codec(store: S, codec: C, rules: Rules) -> Self {
        Self {
            games: Table::new(store, codec, Collection::Games),
            rules,
        }
    }

    /// The typed `games` table.
    pub fn table(&self) -> &Table<S, C, GameId, Game> {
        &self.games
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Reads the current snapshot of a game and checks its invariants.
    ///
    /// # Errors
    /// - [`ArbiterError::NotFound`] for an unknown id
    /// - [`ArbiterError::Corrupt`] if the record can't be decoded or is
    ///   inconsistent
    /// - [`ArbiterError::Store`] if storage fails
    pub async fn current(&self, game_id: &GameId) -> Result<GameSnapshot, ArbiterError> {
        let snapshot = self
            .games
            .get(game_id)
            .await
            .map_err(|e| ArbiterError::from_store(game_id, e))?;

        if let Err(RuleError::Corrupt(reason)) = snapshot.record.validate() {
            tracing::warn!(%game_id, revision = %snapshot.revision, %reason, "corrupt game snapshot");
            return Err(ArbiterError::Corrupt {
                game_id: game_id.clone(),
                reason,
            });
        }
        Ok(snapshot)
    }

    /// Stores a brand-new game (the `Invite` produced by a challenge).
    ///
    /// # Errors
    /// [`ArbiterError::Rule`] with `Corrupt` if the record is not a valid
    /// fresh game, or [`ArbiterError::Store`] if storage fails.
    pub async fn create(&self, game: Game) -> Result<GameSnapshot, ArbiterError> {
        game.validate()?;
        let snapshot = self.games.insert(game).await.map_err(ArbiterError::Store)?;
        tracing::info!(
            game_id = %snapshot.id,
            player1 = %snapshot.record.player1_id,
            player2 = %snapshot.record.player2_id,
            "game created"
        );
        Ok(snapshot)
    }

    /// Applies `intent` to a game, provided the game is still at
    /// `expected`.
    ///
    /// On success returns the committed snapshot, whose revision is
    /// `expected.next()`. Two calls from the same `expected` never both
    /// succeed: the later one gets [`ArbiterError::Conflict`].
    ///
    /// # Errors
    /// - [`ArbiterError::Conflict`] if the game is not (or no longer) at
    ///   `expected`
    /// - [`ArbiterError::Rule`] if the rules reject the intent
    /// - [`ArbiterError::NotFound`], [`ArbiterError::Corrupt`],
    ///   [`ArbiterError::Store`] as for [`current`](Self::current)
    pub async fn apply(
        &self,
        game_id: &GameId,
        intent: &Intent,
        expected: Revision,
    ) -> Result<GameSnapshot, ArbiterError> {
        let current = self.current(game_id).await?;

        if current.revision != expected {
            tracing::debug!(
                %game_id,
                %expected,
                actual = %current.revision,
                "intent computed from a stale snapshot"
            );
            return Err(ArbiterError::Conflict {
                game_id: game_id.clone(),
                expected,
                actual: current.revision,
            });
        }

        let next = self.rules.apply(&current.record, intent).map_err(|e| {
            tracing::debug!(
                %game_id,
                actor = %intent.actor,
                action = %intent.action,
                reason = %e,
                "intent rejected"
            );
            e
        })?;

        let committed = self
            .games
            .commit(game_id, next, expected)
            .await
            .map_err(|e| ArbiterError::from_store(game_id, e))
            .inspect_err(|e| {
                if let ArbiterError::Conflict { actual, .. } = e {
                    tracing::warn!(%game_id, %expected, %actual, "lost commit race");
                }
            })?;

        tracing::info!(
            %game_id,
            actor = %intent.actor,
            action = %intent.action,
            state = %committed.record.state,
            revision = %committed.revision,
            "transition committed"
        );
        Ok(committed)
    }
}
