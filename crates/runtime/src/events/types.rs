//! Event types published by the match worker.
//!
//! Request-shaped events (`RevealRequested`, `HitRequested`, and friends)
//! flow out to the presentation layer, which answers with the matching
//! [`crate::PresentationSignal`]. The rest are observations for combat logs,
//! health bars, and effect badges.

use serde::{Deserialize, Serialize};

use roshambo_core::{EffectId, RoundOutcome, Side, Sign};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Per-round flow: reveals, outcomes, hits.
    Round,
    /// Match lifecycle: spawns, deaths, room and match boundaries.
    Match,
    /// Effect registry and budget changes.
    Effect,
}

/// Event wrapper that carries the topic and typed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Round(RoundEvent),
    Match(MatchEvent),
    Effect(EffectEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Round(_) => Topic::Round,
            Event::Match(_) => Topic::Match,
            Event::Effect(_) => Topic::Effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// Both signs are locked in; play reveal animations for both sides.
    RevealRequested {
        round: u32,
        player: Sign,
        opponent: Sign,
    },

    OutcomeJudged {
        round: u32,
        outcome: RoundOutcome,
    },

    /// Damage landed on `side`; play its hit animation.
    HitRequested {
        side: Side,
        damage: u32,
        critical: bool,
    },

    Dodged {
        side: Side,
    },

    ReflectionApplied {
        side: Side,
        damage: u32,
    },

    /// A behavior trait struck the player outside the normal exchange.
    PunishmentApplied {
        amount: u32,
    },

    RoundEnded {
        round: u32,
        dead: Option<Side>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    OpponentSpawned {
        name: String,
        health: u32,
        max_health: u32,
    },

    /// A power-up activation started; play its animation.
    ActivationRequested,

    /// `side` reached zero health; play its death animation.
    DeathRequested {
        side: Side,
    },

    RoomCleared {
        room: u32,
    },

    MatchOver {
        winner: Side,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    Registered {
        id: EffectId,
        icon: String,
        owner: Option<Side>,
    },

    /// A singleton absorbed a repeat acquisition.
    Stacked {
        id: EffectId,
        stacks: u32,
    },

    /// A one-shot or reflect effect fired and removed itself.
    Consumed {
        id: EffectId,
    },

    /// An effect left the registry at a round or room boundary.
    Expired {
        id: EffectId,
    },

    BudgetChanged {
        can_activate: bool,
    },

    CurrencyDropped {
        coins: u64,
        favor: u64,
    },
}
