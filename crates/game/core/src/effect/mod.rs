//! Player-facing modifiers and their registry.
//!
//! An [`Effect`] is a data record: a kind (what it changes), a lifetime (how
//! long it lasts and how repeats stack), and an owner. The [`EffectRegistry`]
//! owns the live set and dispatches lifecycle hooks; the damage pipeline
//! reads it through narrow query helpers.
mod kinds;
mod lifetime;
mod registry;

pub use kinds::EffectKind;
pub use lifetime::EffectLifetime;
pub use registry::{
    AttackModifiers, EffectRegistry, IncomingModifiers, RegisterOutcome,
};

use serde::{Deserialize, Serialize};

use crate::sign::{RoundOutcome, Sign};
use crate::state::Side;

/// Registry-assigned effect identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// A live modifier owned by a combatant, or by the run itself when `owner`
/// is `None` (such effects participate for whichever side is queried).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub lifetime: EffectLifetime,
    pub owner: Option<Side>,
    /// Set once the effect has contributed its one-shot value.
    pub consumed: bool,
}

impl Effect {
    pub fn new(kind: EffectKind, lifetime: EffectLifetime, owner: Option<Side>) -> Self {
        Self {
            id: EffectId::default(),
            kind,
            lifetime,
            owner,
            consumed: false,
        }
    }

    /// True when this effect applies to `side`'s half of a computation.
    pub fn applies_to(&self, side: Side) -> bool {
        self.owner.map_or(true, |owner| owner == side)
    }

    /// Stack count for singleton effects, 1 otherwise.
    pub fn stacks(&self) -> u32 {
        match self.lifetime {
            EffectLifetime::PersistentSingleton { stacks, .. } => stacks,
            _ => 1,
        }
    }
}

/// Lifecycle hooks broadcast to every registered effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectHook {
    RoomStart,
    RoundStart,
    RoundEnd {
        player: Sign,
        opponent: Sign,
        outcome: RoundOutcome,
    },
    Cleanup,
}

/// Presentation view of one active effect (icon plus duration badge data).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectView {
    pub id: EffectId,
    pub icon: String,
    pub owner: Option<Side>,
    pub remaining_rounds: Option<u32>,
    pub stacks: Option<u32>,
}
