//! Round and activation summaries returned to callers.

use roshambo_core::{InstallOutcome, MatchPhase, RoundOutcome, Side};

/// Everything one completed round decided, returned from
/// [`crate::RuntimeHandle::select_sign`] once the round (including any death
/// sequence) has fully played out.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub outcome: RoundOutcome,
    /// Side that took the main hit; `None` on a draw.
    pub struck: Option<Side>,
    pub damage: u32,
    pub dodged: bool,
    pub critical: bool,
    pub reflection_damage: Option<u32>,
    pub dead: Option<Side>,
    /// Phase the match settled in after the round.
    pub phase: MatchPhase,
}

/// Result of a completed power-up activation.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerUpReport {
    pub outcome: InstallOutcome,
    /// Whether another activation is allowed this round.
    pub can_activate: bool,
}
