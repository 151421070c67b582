//! Opponent templates and room queues.
//!
//! Concrete opponent content is supplied by the embedding application; the
//! core only defines the template shape it spawns from.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::combatant::SignDamage;
use crate::behavior::TraitKind;

/// Template an opponent combatant is built from at spawn time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentSpec {
    pub name: String,
    pub max_health: u32,
    pub base_damage: SignDamage,
    pub dodge_chance: u32,
    pub crit_chance: u32,
    /// Behavior traits bound at spawn, with their numeric parameters.
    pub traits: Vec<TraitKind>,
}

impl OpponentSpec {
    pub fn new(name: impl Into<String>, max_health: u32, base_damage: SignDamage) -> Self {
        Self {
            name: name.into(),
            max_health,
            base_damage,
            dodge_chance: 0,
            crit_chance: 0,
            traits: Vec::new(),
        }
    }

    pub fn with_dodge(mut self, percent: u32) -> Self {
        self.dodge_chance = percent;
        self
    }

    pub fn with_crit(mut self, percent: u32) -> Self {
        self.crit_chance = percent;
        self
    }

    pub fn with_trait(mut self, kind: TraitKind) -> Self {
        self.traits.push(kind);
        self
    }
}

/// Ordered opponents fought consecutively within one room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlan {
    queue: VecDeque<OpponentSpec>,
}

impl RoomPlan {
    pub fn new(opponents: impl IntoIterator<Item = OpponentSpec>) -> Self {
        Self {
            queue: opponents.into_iter().collect(),
        }
    }

    pub fn next_opponent(&mut self) -> Option<OpponentSpec> {
        self.queue.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
