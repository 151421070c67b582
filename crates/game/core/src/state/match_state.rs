//! The aggregate match state.

use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, SignDamage};
use super::phase::MatchPhase;
use super::spawn::RoomPlan;
use super::Side;
use crate::behavior::BehaviorSet;
use crate::budget::UsageBudget;
use crate::combat::Reflection;
use crate::config::GameConfig;
use crate::effect::{Effect, EffectRegistry};

/// Everything one match mutates, constructed once per run and passed by
/// reference into the engine. Replaces any notion of global singleton
/// managers: the registry, budget, and combatants all live here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub player: Combatant,
    pub opponent: Option<Combatant>,
    /// Behaviors of the current opponent; emptied when it dies.
    pub behaviors: BehaviorSet,

    pub phase: MatchPhase,
    /// Rounds completed this run (monotonic, never reset per room).
    pub round: u32,
    pub room: u32,

    /// Opponents still queued for the current room.
    pub room_plan: RoomPlan,

    pub effects: EffectRegistry,
    pub budget: UsageBudget,

    /// Power-up staged while its activation presentation plays.
    pub pending_power_up: Option<Effect>,
    /// Counter-damage staged by a reflect effect during resolution.
    pub pending_reflection: Option<Reflection>,

    // === Determinism ===
    pub run_seed: u64,
    /// Engine operation counter feeding seed mixing.
    pub nonce: u64,

    // === Run currency tallies (persisted by the orchestrator) ===
    pub coins_earned: u64,
    pub favor_earned: u64,
}

impl MatchState {
    /// Start a fresh run: new player, first room queued, spawning phase.
    pub fn new(player: Combatant, first_room: RoomPlan, run_seed: u64, config: &GameConfig) -> Self {
        Self {
            player,
            opponent: None,
            behaviors: BehaviorSet::default(),
            phase: MatchPhase::EnemySpawning,
            round: 0,
            room: 1,
            room_plan: first_room,
            effects: EffectRegistry::default(),
            budget: UsageBudget::new(config.uses_per_round),
            pending_power_up: None,
            pending_reflection: None,
            run_seed,
            nonce: 0,
            coins_earned: 0,
            favor_earned: 0,
        }
    }

    /// Convenience constructor for a stock player.
    pub fn with_default_player(first_room: RoomPlan, run_seed: u64, config: &GameConfig) -> Self {
        let player = Combatant::new(
            Side::Player,
            "player",
            config.player_max_health,
            SignDamage::uniform(config.player_base_damage),
            0,
            0,
        );
        Self::new(player, first_room, run_seed, config)
    }

    pub fn combatant(&self, side: Side) -> Option<&Combatant> {
        match side {
            Side::Player => Some(&self.player),
            Side::Opponent => self.opponent.as_ref(),
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> Option<&mut Combatant> {
        match side {
            Side::Player => Some(&mut self.player),
            Side::Opponent => self.opponent.as_mut(),
        }
    }
}
