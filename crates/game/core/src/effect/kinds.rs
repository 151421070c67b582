//! Effect kind variants.
//!
//! Every power-up and standing modifier is a data record naming its kind plus
//! parameters; the pipeline and engine dispatch on the variant. This keeps
//! the damage composition order in one place instead of spreading it across
//! virtual overrides.

use serde::{Deserialize, Serialize};

use crate::sign::Sign;

/// The concrete modification an effect applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    // ========================================================================
    // Outgoing damage
    // ========================================================================
    /// Additive bonus to the owner's attack value, optionally sign-filtered.
    FlatDamage { amount: u32, sign: Option<Sign> },

    /// Percentage added to the owner's damage multiplier.
    DamagePercent { percent: u32 },

    // ========================================================================
    // Incoming damage
    // ========================================================================
    /// Scales damage against the owner down by a percentage.
    IncomingReduction { percent: u32 },

    /// Returns a percentage of an incoming hit to the original attacker as a
    /// separate delayed event; the instance fires once and removes itself.
    DamageReflect { percent: u32 },

    // ========================================================================
    // Rolls
    // ========================================================================
    /// Added to the owner's dodge chance.
    DodgeBonus { percent: u32 },

    /// Added to the owner's crit chance.
    CritBonus { percent: u32 },

    // ========================================================================
    // Instant / budget
    // ========================================================================
    /// Extra power-up activations; applied straight to the usage budget.
    BonusUses { count: u32, temporary: bool },

    /// Restores health on application.
    Heal { amount: u32 },

    /// Raises max health; typical passive.
    MaxHealthUp { amount: u32 },
}

impl EffectKind {
    /// Display icon tag read by the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            EffectKind::FlatDamage { .. } => "flat-damage",
            EffectKind::DamagePercent { .. } => "damage-percent",
            EffectKind::IncomingReduction { .. } => "incoming-reduction",
            EffectKind::DamageReflect { .. } => "damage-reflect",
            EffectKind::DodgeBonus { .. } => "dodge-bonus",
            EffectKind::CritBonus { .. } => "crit-bonus",
            EffectKind::BonusUses { .. } => "bonus-uses",
            EffectKind::Heal { .. } => "heal",
            EffectKind::MaxHealthUp { .. } => "max-health-up",
        }
    }

    /// True when `other` is the same kind of effect, ignoring parameters.
    /// Singleton stacking keys on this.
    pub fn same_type(&self, other: &EffectKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
