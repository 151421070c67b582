//! High-level runtime orchestrator.
//!
//! The runtime owns the match worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use roshambo_core::{Combatant, GameConfig, MatchPhase, MatchState, RoomPlan, Side, SignDamage};

use crate::api::{
    OpponentStrategy, RandomStrategy, Result, RoundReport, RuntimeError, RuntimeHandle,
    SignProvider,
};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::OracleSet;
use crate::repository::{InMemoryProfileStore, ProfileStore, keys};
use crate::workers::{Command, MatchWorker};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Bounded wait on each presentation signal before forcing progress.
    pub signal_timeout: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            signal_timeout: Duration::from_secs(5),
            event_buffer_size: 128,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates the match simulation.
///
/// Design: the runtime owns the worker and coordinates execution;
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    player_provider: Option<Box<dyn SignProvider>>,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Play one round: ask the sign provider for the player's choice and
    /// drive the round to completion.
    pub async fn step(&mut self) -> Result<RoundReport> {
        let provider = self
            .player_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet)?;

        let state = self.handle.query_state().await?;
        match state.phase {
            MatchPhase::Idle => {
                let sign = provider.provide_sign(&state).await?;
                self.handle.select_sign(sign).await
            }
            MatchPhase::RoomTransition => Err(RuntimeError::AwaitingNextRoom),
            MatchPhase::MatchOver { .. } => Err(RuntimeError::MatchFinished),
            _ => Err(RuntimeError::RoundInProgress),
        }
    }

    /// Run rounds until the match ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.step().await {
                Ok(_) => {}
                Err(RuntimeError::MatchFinished) => return Ok(()),
                Err(error) => return Err(error),
            }
        }
    }

    /// Set the player sign provider.
    pub fn set_player_provider(&mut self, provider: impl SignProvider + 'static) {
        self.player_provider = Some(Box::new(provider));
    }

    /// Shutdown the runtime gracefully.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    player: Option<Combatant>,
    first_room: Option<RoomPlan>,
    run_seed: Option<u64>,
    oracles: Option<OracleSet>,
    store: Option<Arc<dyn ProfileStore>>,
    player_provider: Option<Box<dyn SignProvider>>,
    opponent_strategy: Option<Box<dyn OpponentStrategy>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            player: None,
            first_room: None,
            run_seed: None,
            oracles: None,
            store: None,
            player_provider: None,
            opponent_strategy: None,
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Bounded wait on each presentation signal.
    pub fn signal_timeout(mut self, timeout: Duration) -> Self {
        self.config.signal_timeout = timeout;
        self
    }

    /// Provide a custom player combatant (upgrades still apply on top).
    pub fn player(mut self, player: Combatant) -> Self {
        self.player = Some(player);
        self
    }

    /// Opponents for the first room. Required.
    pub fn first_room(mut self, plan: RoomPlan) -> Self {
        self.first_room = Some(plan);
        self
    }

    /// Fix the run seed for deterministic replays. Defaults to fresh
    /// entropy.
    pub fn run_seed(mut self, seed: u64) -> Self {
        self.run_seed = Some(seed);
        self
    }

    /// Swap the oracle implementations.
    pub fn oracles(mut self, oracles: OracleSet) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Persistence collaborator. Defaults to an in-memory store.
    pub fn profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the player sign provider (optional; required for `step`/`run`).
    pub fn player_provider(mut self, provider: impl SignProvider + 'static) -> Self {
        self.player_provider = Some(Box::new(provider));
        self
    }

    /// Set the opponent's default sign strategy.
    pub fn opponent_strategy(mut self, strategy: impl OpponentStrategy + 'static) -> Self {
        self.opponent_strategy = Some(Box::new(strategy));
        self
    }

    /// Build the runtime and start the match worker.
    pub async fn build(self) -> Result<Runtime> {
        let first_room = self.first_room.ok_or(RuntimeError::MissingRoomPlan)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryProfileStore::new()));
        let oracles = self.oracles.unwrap_or_default();
        let strategy = self
            .opponent_strategy
            .unwrap_or_else(|| Box::new(RandomStrategy));
        let run_seed = self.run_seed.unwrap_or_else(rand::random);

        let mut player = self.player.unwrap_or_else(|| {
            Combatant::new(
                Side::Player,
                "player",
                self.config.game_config.player_max_health,
                SignDamage::uniform(self.config.game_config.player_base_damage),
                0,
                0,
            )
        });
        apply_permanent_upgrades(&mut player, store.as_ref());

        let state = MatchState::new(player, first_room, run_seed, &self.config.game_config);

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size);
        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, events.clone());

        let worker = MatchWorker::new(
            state,
            oracles,
            strategy,
            store,
            command_rx,
            events,
            self.config.signal_timeout,
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle,
            player_provider: self.player_provider,
            worker_handle,
        })
    }
}

/// Fold the profile store's permanent upgrade fields into the starting
/// player. A failing store read skips the upgrade, never fails the build.
fn apply_permanent_upgrades(player: &mut Combatant, store: &dyn ProfileStore) {
    match store.get(keys::UPGRADE_MAX_HEALTH) {
        Ok(Some(bonus)) if bonus > 0 => {
            let bonus = bonus as u32;
            player.base_max_health += bonus;
            player.max_health += bonus;
            player.health = player.max_health;
            debug!(bonus, "applied permanent max-health upgrade");
        }
        Ok(_) => {}
        Err(error) => debug!(%error, "skipping max-health upgrade"),
    }
    match store.get(keys::UPGRADE_BASE_DAMAGE) {
        Ok(Some(bonus)) if bonus > 0 => {
            player.base_damage.add(None, bonus as u32);
            debug!(bonus, "applied permanent base-damage upgrade");
        }
        Ok(_) => {}
        Err(error) => debug!(%error, "skipping base-damage upgrade"),
    }
}
