//! Deterministic match rules for the sign-duel roguelike.
//!
//! `roshambo-core` defines the canonical simulation: combatants, the effect
//! registry, the damage pipeline, opponent behaviors, and the phase-gated
//! match engine. The crate performs no I/O and holds no clocks or channels;
//! randomness and balance numbers are injected through the oracles in
//! [`env`], so every match is replayable from its seed and input sequence.
//! All state mutation flows through [`engine::MatchEngine`].
pub mod behavior;
pub mod budget;
pub mod combat;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod sign;
pub mod state;

pub use behavior::{BehaviorSet, RoundContext, TraitInstance, TraitKind, TraitReaction};
pub use budget::UsageBudget;
pub use combat::{DamageReport, Reflection, resolve_damage, scale_rounded};
pub use config::GameConfig;
pub use effect::{
    Effect, EffectHook, EffectId, EffectKind, EffectLifetime, EffectRegistry, EffectView,
    RegisterOutcome,
};
pub use engine::{
    AppliedReaction, DeathReport, EngineError, InstallOutcome, MatchEngine, NextStep,
    RoundDamage, RoundEndReport, SpawnReport,
};
pub use env::{CombatTables, DefaultTables, GameEnv, OracleError, PcgRng, RngOracle, TablesOracle,
    compute_seed};
pub use sign::{RoundOutcome, Sign};
pub use state::{
    Combatant, MatchPhase, MatchState, OpponentSpec, RoomPlan, Side, SignDamage,
};
