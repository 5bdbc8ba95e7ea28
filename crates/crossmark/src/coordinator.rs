//! `Coordinator` builder and host-side API.
//!
//! A coordinator is what a host (one device, one local player) talks
//! to. It ties the layers together: storage feed → cache for reading,
//! intent → directory/arbiter → storage for writing.

use std::collections::BTreeMap;
use std::sync::Arc;

use crossmark_arbiter::ArbiterError;
use crossmark_game::{Action, Game, GameSnapshot, GameState, Intent, Rules};
use crossmark_lobby::{Directory, DuplicatePolicy, LobbyConfig};
use crossmark_player::{Player, PlayerRegistry, PlayerSnapshot};
use crossmark_protocol::{Codec, GameId, JsonCodec, PlayerId};
use crossmark_store::{MemoryStore, Storage};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::{self, Cache};
use crate::{CoordinatorConfig, CrossmarkError, RetryPolicy};

/// Every cached game, by id.
pub type GameMap = BTreeMap<GameId, GameSnapshot>;

/// Every cached player, by id.
pub type PlayerMap = BTreeMap<PlayerId, PlayerSnapshot>;

/// Builder for configuring and starting a [`Coordinator`].
///
/// # Example
///
/// ```rust,no_run
/// use crossmark::prelude::*;
///
/// # async fn demo(store: MemoryStore, me: PlayerId) -> Result<(), CrossmarkError> {
/// let _host = Coordinator::builder()
///     .require_ready(true)
///     .duplicate_policy(DuplicatePolicy::Allow)
///     .start(store, me)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
}

impl CoordinatorBuilder {
    /// Creates a new builder with default settings.
    ///
    /// Works for every store; the store type is fixed by `start` or
    /// `register`, not here.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(mut self, rules: Rules) -> Self {
        self.config.rules = rules;
        self
    }

    /// Gates moves on both players having sent `Ready`.
    pub fn require_ready(mut self, on: bool) -> Self {
        self.config.rules.require_ready = on;
        self
    }

    pub fn lobby(mut self, lobby: LobbyConfig) -> Self {
        self.config.lobby = lobby;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.lobby.duplicate_policy = policy;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn cache_resync_on_lag(mut self, on: bool) -> Self {
        self.config.cache_resync_on_lag = on;
        self
    }

    /// Starts a coordinator acting as `player_id`.
    ///
    /// Returns once both caches hold a full read of storage; from then
    /// on they follow the subscription feed.
    pub async fn start<S: Storage>(self, store: S, player_id: PlayerId) -> Result<Coordinator<S>, CrossmarkError> {
        let directory = Directory::new(store, self.config.rules, self.config.lobby.clone());
        Coordinator::start(directory, player_id, self.config).await
    }

    /// Registers a new player called `name`, then starts a coordinator
    /// acting as them.
    pub async fn register<S: Storage>(self, store: S, name: &str) -> Result<Coordinator<S>, CrossmarkError> {
        let player = PlayerRegistry::new(store.clone()).register(name).await?;
        self.start(store, player.id).await
    }
}

/// One host's view of, and handle on, the shared games.
///
/// Reads come from the cache, which may trail storage by a few changes.
/// Writes go through the arbiter with the cached revision; if the cache
/// was behind, the write fails with a conflict and the cache is
/// refreshed for that game before the error is returned.
///
/// Dropping the coordinator stops its subscription tasks.
#[derive(Debug)]
pub struct Coordinator<S, C = JsonCodec> {
    player_id: PlayerId,
    directory: Directory<S, C>,
    config: CoordinatorConfig,
    games: Cache<GameId, Game>,
    players: Cache<PlayerId, Player>,
    pumps: Vec<JoinHandle<()>>,
}

// Concrete so `Coordinator::builder()` needs no annotations.
impl Coordinator<MemoryStore> {
    /// Creates a new builder.
    ///
    /// The builder is not tied to [`MemoryStore`]: its `start` and
    /// `register` accept any [`Storage`] and return a coordinator over that
    /// store. [`CoordinatorBuilder::new`] is the same builder without
    /// naming `Coordinator` at all.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }
}

impl<S: Storage, C: Codec> Coordinator<S, C> {
    /// Starts a coordinator over an existing directory.
    pub async fn start(
        directory: Directory<S, C>,
        player_id: PlayerId,
        config: CoordinatorConfig,
    ) -> Result<Self, CrossmarkError> {
        let game_table = directory.arbiter().table().clone();
        let player_table = directory.players().table().clone();

        let (games, game_feed) = cache::seed(&game_table, &config.retry).await?;
        let (players, player_feed) = cache::seed(&player_table, &config.retry).await?;

        let pumps = vec![
            tokio::spawn(cache::pump(
                game_table,
                game_feed,
                Arc::clone(&games),
                config.cache_resync_on_lag,
                config.retry.clone(),
            )),
            tokio::spawn(cache::pump(
                player_table,
                player_feed,
                Arc::clone(&players),
                config.cache_resync_on_lag,
                config.retry.clone(),
            )),
        ];

        tracing::info!(
            %player_id,
            games = games.borrow().len(),
            players = players.borrow().len(),
            "coordinator started"
        );

        Ok(Self {
            player_id,
            directory,
            config,
            games,
            players,
            pumps,
        })
    }

    /// The local player every submission acts as.
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn directory(&self) -> &Directory<S, C> {
        &self.directory
    }

    // -- Reads ---------------------------------------------------------------

    /// A live, read-only view of every cached game.
    pub fn games(&self) -> watch::Receiver<GameMap> {
        self.games.subscribe()
    }

    /// A live, read-only view of every cached player.
    pub fn players(&self) -> watch::Receiver<PlayerMap> {
        self.players.subscribe()
    }

    pub fn game(&self, game_id: &GameId) -> Option<GameSnapshot> {
        self.games.borrow().get(game_id).cloned()
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<PlayerSnapshot> {
        self.players.borrow().get(player_id).cloned()
    }

    /// Cached games the local player takes part in.
    pub fn visible_sessions(&self) -> Vec<GameSnapshot> {
        self.games
            .borrow()
            .values()
            .filter(|g| g.record.involves(&self.player_id))
            .cloned()
            .collect()
    }

    /// Cached challenges waiting for the local player to accept.
    pub fn incoming_challenges(&self) -> Vec<GameSnapshot> {
        self.games
            .borrow()
            .values()
            .filter(|g| g.record.state == GameState::Invite && g.record.player2_id == self.player_id)
            .cloned()
            .collect()
    }

    /// Reads one game straight from storage into the cache.
    pub async fn refresh(&self, game_id: &GameId) -> Result<GameSnapshot, CrossmarkError> {
        let arbiter = self.directory.arbiter();
        let snapshot = self
            .config
            .retry
            .run(|| async move { arbiter.current(game_id).await.map_err(CrossmarkError::from) })
            .await?;
        self.games.send_if_modified(|map| cache::merge(map, snapshot.clone()));
        Ok(snapshot)
    }

    // -- Writes --------------------------------------------------------------

    /// Challenges `target` to a new game.
    pub async fn submit_challenge(&self, target: &PlayerId) -> Result<GameSnapshot, CrossmarkError> {
        let snapshot = self.directory.create_challenge(&self.player_id, target).await?;
        self.games.send_if_modified(|map| cache::merge(map, snapshot.clone()));
        Ok(snapshot)
    }

    /// Accepts a challenge addressed to the local player.
    pub async fn submit_accept(&self, game_id: &GameId) -> Result<GameSnapshot, CrossmarkError> {
        self.submit(game_id, Action::Accept).await
    }

    /// Places the local player's mark on `cell` (0..9, row-major).
    pub async fn submit_move(&self, game_id: &GameId, cell: usize) -> Result<GameSnapshot, CrossmarkError> {
        self.submit(game_id, Action::Move { cell }).await
    }

    /// Signals that the local player is ready to play.
    pub async fn submit_ready(&self, game_id: &GameId) -> Result<GameSnapshot, CrossmarkError> {
        self.submit(game_id, Action::Ready).await
    }

    /// Changes the local player's display name.
    pub async fn rename(&self, name: &str) -> Result<PlayerSnapshot, CrossmarkError> {
        let snapshot = self
            .directory
            .players()
            .rename(&self.player_id, &self.player_id, name)
            .await?;
        self.players.send_if_modified(|map| cache::merge(map, snapshot.clone()));
        Ok(snapshot)
    }

    async fn submit(&self, game_id: &GameId, action: Action) -> Result<GameSnapshot, CrossmarkError> {
        let expected = match self.game(game_id) {
            Some(cached) => cached.revision,
            None => self.refresh(game_id).await?.revision,
        };
        let intent = Intent::new(self.player_id.clone(), action);

        match self.directory.arbiter().apply(game_id, &intent, expected).await {
            Ok(committed) => {
                self.games.send_if_modified(|map| cache::merge(map, committed.clone()));
                Ok(committed)
            }
            Err(e @ ArbiterError::Conflict { .. }) => {
                if let Err(refresh) = self.refresh(game_id).await {
                    tracing::warn!(%game_id, error = %refresh, "refresh after conflict failed");
                }
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<S, C> Drop for Coordinator<S, C> {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}
