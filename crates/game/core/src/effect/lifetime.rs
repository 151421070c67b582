//! Effect lifetime kinds.

use serde::{Deserialize, Serialize};

/// How long an effect stays registered, and how repeats of it combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectLifetime {
    /// Contributes once, then removes itself.
    OneShot,

    /// Ticks down at round end; removed at zero.
    RoundScoped { remaining: u32 },

    /// Removed wholesale on room transition.
    RoomScoped,

    /// At most one live instance per effect type across the run; repeat
    /// acquisitions raise `stacks` up to `max_stacks` instead of adding
    /// instances. Stacks never decrease within a run.
    PersistentSingleton { stacks: u32, max_stacks: u32 },

    /// Folds into a combatant's permanent bonus fields; recomputed from
    /// scratch on room transitions rather than accumulated.
    Passive,
}

impl EffectLifetime {
    pub fn round_scoped(rounds: u32) -> Self {
        EffectLifetime::RoundScoped { remaining: rounds }
    }

    pub fn singleton(max_stacks: u32) -> Self {
        EffectLifetime::PersistentSingleton {
            stacks: 1,
            max_stacks,
        }
    }

    /// Remaining-rounds counter for duration badges, when applicable.
    pub fn remaining_rounds(&self) -> Option<u32> {
        match self {
            EffectLifetime::RoundScoped { remaining } => Some(*remaining),
            _ => None,
        }
    }
}
