//! Match phase machine.

use serde::{Deserialize, Serialize};

use super::Side;
use crate::sign::{RoundOutcome, Sign};

/// Phase the match is currently in.
///
/// The engine only advances a phase in response to an explicit operation;
/// phases with a presentation wait (`Selecting`, `ApplyingDamage`, `Dying`,
/// `PowerUpActivation`) stay put until the orchestrator reports completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for the next opponent to be built from the room queue.
    EnemySpawning,

    /// Accepting exactly one player sign selection.
    Idle,

    /// Both signs are locked in; reveal presentation is in flight.
    Selecting { player: Sign, opponent: Sign },

    /// Signs revealed; outcome judged next. Pure, no wait.
    EvaluatingOutcome { player: Sign, opponent: Sign },

    /// Damage resolved and applied; hit presentation is in flight.
    ApplyingDamage {
        player: Sign,
        opponent: Sign,
        outcome: RoundOutcome,
    },

    /// A combatant reached zero health; death presentation is in flight.
    Dying { side: Side },

    /// An out-of-turn power-up activation is in flight.
    PowerUpActivation,

    /// Room cleared; room-scoped cleanup runs before the next room starts.
    RoomTransition,

    /// The player died; the match is finished.
    MatchOver { winner: Side },
}

impl MatchPhase {
    /// Short label for errors and logs.
    pub fn label(&self) -> &'static str {
        match self {
            MatchPhase::EnemySpawning => "EnemySpawning",
            MatchPhase::Idle => "Idle",
            MatchPhase::Selecting { .. } => "Selecting",
            MatchPhase::EvaluatingOutcome { .. } => "EvaluatingOutcome",
            MatchPhase::ApplyingDamage { .. } => "ApplyingDamage",
            MatchPhase::Dying { .. } => "Dying",
            MatchPhase::PowerUpActivation => "PowerUpActivation",
            MatchPhase::RoomTransition => "RoomTransition",
            MatchPhase::MatchOver { .. } => "MatchOver",
        }
    }
}
