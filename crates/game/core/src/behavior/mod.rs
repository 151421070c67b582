//! Opponent behavior composition.
//!
//! Behaviors ("traits") are bound to one opponent at spawn time and live in
//! its [`BehaviorSet`], not in the effect registry. They hook the round
//! lifecycle at two extra points the player's effects never see: before the
//! round resolves (observe) and after damage lands (act). Hooks never mutate
//! combatants directly; they return [`TraitReaction`]s for the engine to
//! apply, which keeps them pure and non-blocking.
mod kinds;
mod set;

pub use kinds::TraitKind;
pub use set::{BehaviorSet, RoundContext, TraitInstance, TraitReaction};
