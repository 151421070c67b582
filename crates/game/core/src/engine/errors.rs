use thiserror::Error;

use crate::env::OracleError;

/// Errors surfaced by [`super::MatchEngine`] operations.
///
/// All of these are recoverable: the caller logs and holds the current phase
/// rather than advancing. `BudgetExhausted` in particular is the normal
/// negative answer to an activation attempt, not a fault.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("operation `{op}` is not valid in phase {phase}")]
    InvalidPhase {
        op: &'static str,
        phase: &'static str,
    },

    #[error("no opponent is present")]
    MissingOpponent,

    #[error("no opponent queued in the room plan")]
    EmptyRoomPlan,

    #[error("power-up budget exhausted for this round")]
    BudgetExhausted,

    #[error("no power-up staged for activation")]
    NoPendingPowerUp,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}
