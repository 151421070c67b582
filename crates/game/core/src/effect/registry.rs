//! The active effect set.

use serde::{Deserialize, Serialize};

use super::{Effect, EffectHook, EffectId, EffectKind, EffectLifetime, EffectView};
use crate::sign::Sign;
use crate::state::Side;

/// What happened when an effect was registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new instance joined the registry.
    Added(EffectId),
    /// An existing singleton absorbed the registration; `stacks` is its new
    /// accumulator value.
    Stacked { id: EffectId, stacks: u32 },
}

impl RegisterOutcome {
    pub fn id(&self) -> EffectId {
        match self {
            RegisterOutcome::Added(id) => *id,
            RegisterOutcome::Stacked { id, .. } => *id,
        }
    }
}

/// Attacker-side contributions for one damage computation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackModifiers {
    pub flat: u32,
    pub percent_delta: u32,
    /// One-shot effects that contributed and must be consumed by the caller.
    pub fired: Vec<EffectId>,
}

/// Defender-side contributions for one damage computation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncomingModifiers {
    /// Reductions applied sequentially, as `(id, percent)`.
    pub reductions: Vec<(EffectId, u32)>,
    /// Reflect effects, as `(id, percent)`. Every reflect that fires is
    /// consumed by the caller regardless of lifetime.
    pub reflects: Vec<(EffectId, u32)>,
}

/// Owns the currently active effects and dispatches lifecycle hooks.
///
/// One registry lives for the whole run, so singleton stacks survive room and
/// opponent turnover without any static state; a new run builds a new
/// registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRegistry {
    effects: Vec<Effect>,
    next_id: u32,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect to the active set.
    ///
    /// For `PersistentSingleton` lifetimes, a live instance of the same kind
    /// absorbs the registration: its stack accumulator rises (up to its cap)
    /// and the new instance is discarded.
    pub fn register(&mut self, mut effect: Effect) -> RegisterOutcome {
        if matches!(effect.lifetime, EffectLifetime::PersistentSingleton { .. }) {
            let existing = self.effects.iter_mut().find(|e| {
                matches!(e.lifetime, EffectLifetime::PersistentSingleton { .. })
                    && e.kind.same_type(&effect.kind)
                    && e.owner == effect.owner
            });
            if let Some(existing) = existing {
                if let EffectLifetime::PersistentSingleton { stacks, max_stacks } =
                    &mut existing.lifetime
                {
                    *stacks = (*stacks + 1).min(*max_stacks);
                    return RegisterOutcome::Stacked {
                        id: existing.id,
                        stacks: *stacks,
                    };
                }
            }
        }

        self.next_id += 1;
        effect.id = EffectId(self.next_id);
        let id = effect.id;
        self.effects.push(effect);
        RegisterOutcome::Added(id)
    }

    /// Remove an effect. Safe to call on an already-removed id (no-op).
    pub fn remove(&mut self, id: EffectId) -> Option<Effect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }

    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Mark effects consumed so the next purge drops them.
    pub fn mark_consumed(&mut self, ids: &[EffectId]) {
        for effect in &mut self.effects {
            if ids.contains(&effect.id) {
                effect.consumed = true;
            }
        }
    }

    /// Invoke a lifecycle hook on a snapshot of the active set, so effects
    /// removed during the callback cannot corrupt iteration. Returns the
    /// effects that left the registry.
    ///
    /// After any broadcast no fired one-shot and no zero-remaining
    /// round-scoped effect remains registered.
    pub fn broadcast(&mut self, hook: EffectHook) -> Vec<Effect> {
        let snapshot: Vec<EffectId> = self.effects.iter().map(|e| e.id).collect();

        for id in snapshot {
            let Some(effect) = self.effects.iter_mut().find(|e| e.id == id) else {
                continue;
            };
            match hook {
                EffectHook::RoundEnd { .. } => {
                    if let EffectLifetime::RoundScoped { remaining } = &mut effect.lifetime {
                        *remaining = remaining.saturating_sub(1);
                    }
                }
                EffectHook::Cleanup => {
                    effect.consumed = true;
                }
                EffectHook::RoomStart | EffectHook::RoundStart => {}
            }
        }

        self.purge_expired()
    }

    /// Remove consumed one-shots and expired round-scoped effects.
    pub fn purge_expired(&mut self) -> Vec<Effect> {
        let mut removed = Vec::new();
        self.effects.retain(|e| {
            let expired = e.consumed
                || matches!(e.lifetime, EffectLifetime::RoundScoped { remaining: 0 });
            if expired {
                removed.push(e.clone());
            }
            !expired
        });
        removed
    }

    /// Remove everything with a `RoomScoped` lifetime.
    pub fn clear_room_scoped(&mut self) -> Vec<Effect> {
        let mut removed = Vec::new();
        self.effects.retain(|e| {
            if e.lifetime == EffectLifetime::RoomScoped {
                removed.push(e.clone());
                return false;
            }
            true
        });
        removed
    }

    /// Remove every effect owned by `side` (opponent turnover).
    pub fn clear_owned_by(&mut self, side: Side) -> Vec<Effect> {
        let mut removed = Vec::new();
        self.effects.retain(|e| {
            if e.owner == Some(side) {
                removed.push(e.clone());
                return false;
            }
            true
        });
        removed
    }

    // ========================================================================
    // Query helpers for the damage pipeline
    // ========================================================================

    /// Flat and percentage contributions for `side` attacking with `sign`.
    ///
    /// Passive-lifetime effects are skipped here: their value lives in the
    /// combatant's folded bonus fields.
    pub fn attack_modifiers(&self, side: Side, sign: Sign) -> AttackModifiers {
        let mut mods = AttackModifiers::default();
        for effect in &self.effects {
            if !effect.applies_to(side)
                || effect.consumed
                || effect.lifetime == EffectLifetime::Passive
            {
                continue;
            }
            let contributed = match effect.kind {
                EffectKind::FlatDamage { amount, sign: filter } => {
                    if filter.is_none() || filter == Some(sign) {
                        mods.flat += amount * effect.stacks();
                        true
                    } else {
                        false
                    }
                }
                EffectKind::DamagePercent { percent } => {
                    mods.percent_delta += percent * effect.stacks();
                    true
                }
                _ => false,
            };
            if contributed && effect.lifetime == EffectLifetime::OneShot {
                mods.fired.push(effect.id);
            }
        }
        mods
    }

    /// Reduction and reflect contributions for `side` defending.
    pub fn incoming_modifiers(&self, side: Side) -> IncomingModifiers {
        let mut mods = IncomingModifiers::default();
        for effect in &self.effects {
            if !effect.applies_to(side) || effect.consumed {
                continue;
            }
            match effect.kind {
                EffectKind::IncomingReduction { percent } => {
                    mods.reductions.push((effect.id, percent.min(100)));
                }
                EffectKind::DamageReflect { percent } => {
                    mods.reflects.push((effect.id, percent));
                }
                _ => {}
            }
        }
        mods
    }

    /// Total dodge-chance bonus for `side`.
    pub fn dodge_bonus(&self, side: Side) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.applies_to(side) && !e.consumed)
            .map(|e| match e.kind {
                EffectKind::DodgeBonus { percent } => percent * e.stacks(),
                _ => 0,
            })
            .sum()
    }

    /// Total crit-chance bonus for `side`.
    pub fn crit_bonus(&self, side: Side) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.applies_to(side) && !e.consumed)
            .map(|e| match e.kind {
                EffectKind::CritBonus { percent } => percent * e.stacks(),
                _ => 0,
            })
            .sum()
    }

    /// Passive-lifetime effects, for permanent-bonus recomputation.
    pub fn passive_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(|e| e.lifetime == EffectLifetime::Passive)
    }

    /// Presentation view of the active set.
    pub fn views(&self) -> Vec<EffectView> {
        self.effects
            .iter()
            .map(|e| EffectView {
                id: e.id,
                icon: e.kind.icon().to_string(),
                owner: e.owner,
                remaining_rounds: e.lifetime.remaining_rounds(),
                stacks: match e.lifetime {
                    EffectLifetime::PersistentSingleton { stacks, .. } => Some(stacks),
                    _ => None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::RoundOutcome;

    fn round_end() -> EffectHook {
        EffectHook::RoundEnd {
            player: Sign::Rock,
            opponent: Sign::Scissors,
            outcome: RoundOutcome::Win,
        }
    }

    #[test]
    fn singleton_stacks_instead_of_duplicating() {
        let mut registry = EffectRegistry::new();
        // Each stack adds 10%, capped at 3 stacks (30% effective).
        let effect = || {
            Effect::new(
                EffectKind::DamagePercent { percent: 10 },
                EffectLifetime::singleton(3),
                Some(Side::Player),
            )
        };

        let first = registry.register(effect());
        assert!(matches!(first, RegisterOutcome::Added(_)));

        for expected in [2, 3, 3, 3] {
            let outcome = registry.register(effect());
            assert_eq!(
                outcome,
                RegisterOutcome::Stacked {
                    id: first.id(),
                    stacks: expected
                }
            );
        }

        assert_eq!(registry.len(), 1);
        let mods = registry.attack_modifiers(Side::Player, Sign::Rock);
        // Never exceeds the 30% cap no matter how often it was acquired.
        assert_eq!(mods.percent_delta, 30);
    }

    #[test]
    fn round_scoped_expires_after_counted_rounds() {
        let mut registry = EffectRegistry::new();
        registry.register(Effect::new(
            EffectKind::FlatDamage {
                amount: 5,
                sign: None,
            },
            EffectLifetime::round_scoped(3),
            Some(Side::Player),
        ));

        // Contributes in rounds 1-3.
        for _ in 0..3 {
            assert_eq!(registry.attack_modifiers(Side::Player, Sign::Rock).flat, 5);
            registry.broadcast(round_end());
        }

        // Absent at the start of round 4.
        assert!(registry.is_empty());
        assert_eq!(registry.attack_modifiers(Side::Player, Sign::Rock).flat, 0);
    }

    #[test]
    fn consumed_one_shot_contributes_nothing_even_if_retained() {
        let mut registry = EffectRegistry::new();
        let outcome = registry.register(Effect::new(
            EffectKind::FlatDamage {
                amount: 7,
                sign: None,
            },
            EffectLifetime::OneShot,
            Some(Side::Player),
        ));

        let mods = registry.attack_modifiers(Side::Player, Sign::Paper);
        assert_eq!(mods.flat, 7);
        assert_eq!(mods.fired, vec![outcome.id()]);

        // Artificially retain the effect past its firing.
        registry.mark_consumed(&mods.fired);
        let again = registry.attack_modifiers(Side::Player, Sign::Paper);
        assert_eq!(again.flat, 0);
        assert!(again.fired.is_empty());

        // Any broadcast purges it.
        let removed = registry.broadcast(EffectHook::RoundStart);
        assert_eq!(removed.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn cleanup_broadcast_empties_the_registry() {
        let mut registry = EffectRegistry::new();
        registry.register(Effect::new(
            EffectKind::DamagePercent { percent: 10 },
            EffectLifetime::singleton(5),
            Some(Side::Player),
        ));
        registry.register(Effect::new(
            EffectKind::CritBonus { percent: 5 },
            EffectLifetime::RoomScoped,
            None,
        ));

        let removed = registry.broadcast(EffectHook::Cleanup);
        assert_eq!(removed.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = EffectRegistry::new();
        let id = registry
            .register(Effect::new(
                EffectKind::DodgeBonus { percent: 10 },
                EffectLifetime::RoomScoped,
                Some(Side::Opponent),
            ))
            .id();

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn sign_filtered_flat_only_counts_matching_sign() {
        let mut registry = EffectRegistry::new();
        registry.register(Effect::new(
            EffectKind::FlatDamage {
                amount: 4,
                sign: Some(Sign::Rock),
            },
            EffectLifetime::RoomScoped,
            Some(Side::Player),
        ));

        assert_eq!(registry.attack_modifiers(Side::Player, Sign::Rock).flat, 4);
        assert_eq!(registry.attack_modifiers(Side::Player, Sign::Paper).flat, 0);
    }

    #[test]
    fn ownerless_effects_apply_to_both_sides() {
        let mut registry = EffectRegistry::new();
        registry.register(Effect::new(
            EffectKind::DamagePercent { percent: 15 },
            EffectLifetime::RoomScoped,
            None,
        ));

        assert_eq!(
            registry.attack_modifiers(Side::Player, Sign::Rock).percent_delta,
            15
        );
        assert_eq!(
            registry
                .attack_modifiers(Side::Opponent, Sign::Rock)
                .percent_delta,
            15
        );
    }
}
