//! Abstractions for sourcing player and opponent signs.
//!
//! Runtime users plug in a [`SignProvider`] so the match loop can run with
//! human input, scripted fixtures, or AI policies. The opponent side uses a
//! synchronous [`OpponentStrategy`], consulted only when the opponent's
//! behavior traits do not dictate a sign themselves.
use async_trait::async_trait;

use roshambo_core::env::roll;
use roshambo_core::{MatchState, PcgRng, RngOracle, Side, Sign, compute_seed};

use super::errors::Result;

/// Trait for providing the player's sign based on the current match state.
#[async_trait]
pub trait SignProvider: Send + Sync {
    /// Provide a sign for the round about to start.
    async fn provide_sign(&self, state: &MatchState) -> Result<Sign>;
}

/// Always reveals the same sign. Useful for testing and fixtures.
pub struct FixedSignProvider(pub Sign);

#[async_trait]
impl SignProvider for FixedSignProvider {
    async fn provide_sign(&self, _state: &MatchState) -> Result<Sign> {
        Ok(self.0)
    }
}

/// Default opponent sign choice when no trait overrides it.
pub trait OpponentStrategy: Send + Sync {
    fn choose(&self, state: &MatchState) -> Sign;
}

/// Uniformly random choice; fresh entropy every round.
pub struct RandomStrategy;

impl OpponentStrategy for RandomStrategy {
    fn choose(&self, _state: &MatchState) -> Sign {
        Sign::from_roll(rand::random::<u32>())
    }
}

/// Deterministic choice derived from the run seed, for replays and tests.
pub struct SeededStrategy;

impl OpponentStrategy for SeededStrategy {
    fn choose(&self, state: &MatchState) -> Sign {
        let seed = compute_seed(
            state.run_seed,
            state.round as u64 + 1,
            Side::Opponent.index(),
            roll::SIGN_CHOICE,
        );
        Sign::from_roll(PcgRng.next_u32(seed))
    }
}

/// Always chooses the same sign. Useful for testing.
pub struct FixedStrategy(pub Sign);

impl OpponentStrategy for FixedStrategy {
    fn choose(&self, _state: &MatchState) -> Sign {
        self.0
    }
}
