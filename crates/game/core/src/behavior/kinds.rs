//! Behavior trait variants.

use serde::{Deserialize, Serialize};

/// A behavior bound to an opponent, configured with numeric parameters at
/// spawn. Each variant is dispatched by [`super::BehaviorSet`]'s hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitKind {
    /// Punishes the player with a percentage of their max health once they
    /// reveal the same sign `required_consecutive` times in a row, then
    /// resets the streak.
    StreakPunisher {
        required_consecutive: u32,
        percent_max_health: u32,
    },

    /// Once health falls below `threshold_percent` of max, transitions to an
    /// armored state exactly once and registers a standing incoming-damage
    /// reduction on itself. Never re-enters even if health recovers.
    Harden {
        threshold_percent: u32,
        reduction_percent: u32,
    },

    /// Sub-combatants that each independently roll `attack_chance` to hit
    /// the player for `damage` after each resolved round.
    MinionPack {
        count: u32,
        attack_chance: u32,
        damage: u32,
    },

    /// Drops currency exactly once on death.
    Bounty { coins: u32, favor: u32 },

    /// Sign-choice override: with `chance` percent, counters the player's
    /// most recent sign instead of choosing randomly.
    SignReader { chance: u32 },
}
