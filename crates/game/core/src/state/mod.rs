//! Match state types.
//!
//! [`MatchState`] is the single aggregate the engine mutates; everything a
//! round needs (combatants, effects, budget, queued opponents) hangs off it,
//! so there is no hidden global state and tests can build a match from parts.
mod combatant;
mod match_state;
mod phase;
mod spawn;

pub use combatant::{Combatant, SignDamage};
pub use match_state::MatchState;
pub use phase::MatchPhase;
pub use spawn::{OpponentSpec, RoomPlan};

use serde::{Deserialize, Serialize};

/// Identity of a combatant within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Stable index used for seed mixing.
    pub fn index(self) -> u32 {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}
