//! Combatants and their per-sign damage tables.

use serde::{Deserialize, Serialize};

use super::Side;
use crate::sign::Sign;

/// Base damage dealt with each sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDamage {
    pub rock: u32,
    pub paper: u32,
    pub scissors: u32,
}

impl SignDamage {
    pub const fn uniform(value: u32) -> Self {
        Self {
            rock: value,
            paper: value,
            scissors: value,
        }
    }

    pub fn get(&self, sign: Sign) -> u32 {
        match sign {
            Sign::Rock => self.rock,
            Sign::Paper => self.paper,
            Sign::Scissors => self.scissors,
        }
    }

    /// Add `amount` to one sign, or to all three when `sign` is `None`.
    pub fn add(&mut self, sign: Option<Sign>, amount: u32) {
        match sign {
            Some(Sign::Rock) => self.rock += amount,
            Some(Sign::Paper) => self.paper += amount,
            Some(Sign::Scissors) => self.scissors += amount,
            None => {
                self.rock += amount;
                self.paper += amount;
                self.scissors += amount;
            }
        }
    }
}

/// One participant in the match.
///
/// # Invariants
///
/// - `0 <= health <= max_health` after every mutation; [`Combatant::apply_damage`]
///   and [`Combatant::heal`] clamp.
/// - `max_health` is always `base_max_health + passive_max_health`; the
///   passive fields are recomputed from scratch, never accumulated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub side: Side,
    pub name: String,

    pub health: u32,
    /// Max health before permanent passive bonuses.
    pub base_max_health: u32,
    pub max_health: u32,

    pub base_damage: SignDamage,
    /// Percent chance to dodge an incoming hit.
    pub dodge_chance: u32,
    /// Percent chance to land a critical hit.
    pub crit_chance: u32,

    /// One-shot bonus folded into the next damage computation, then cleared.
    pub temp_bonus_damage: u32,

    // === Recomputed from passive effects (see MatchEngine::recompute_passives) ===
    pub passive_flat: SignDamage,
    pub passive_percent: u32,
    pub passive_max_health: u32,
}

impl Combatant {
    pub fn new(
        side: Side,
        name: impl Into<String>,
        max_health: u32,
        base_damage: SignDamage,
        dodge_chance: u32,
        crit_chance: u32,
    ) -> Self {
        Self {
            side,
            name: name.into(),
            health: max_health,
            base_max_health: max_health,
            max_health,
            base_damage,
            dodge_chance,
            crit_chance,
            temp_bonus_damage: 0,
            passive_flat: SignDamage::default(),
            passive_percent: 0,
            passive_max_health: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, clamping health into `[0, max_health]`.
    ///
    /// Returns the amount actually removed.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Restore health, clamping at `max_health`. Returns the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_health - self.health);
        self.health += healed;
        healed
    }

    /// Rebuild `max_health` after the passive fields changed, keeping current
    /// health within bounds.
    pub fn refresh_max_health(&mut self) {
        self.max_health = self.base_max_health + self.passive_max_health;
        self.health = self.health.min(self.max_health);
    }

    /// Reset the recomputed passive fields before a fresh fold.
    pub fn clear_passives(&mut self) {
        self.passive_flat = SignDamage::default();
        self.passive_percent = 0;
        self.passive_max_health = 0;
    }
}
