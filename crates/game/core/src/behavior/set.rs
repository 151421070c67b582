//! Behavior instances and hook dispatch.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::kinds::TraitKind;
use crate::combat::scale_rounded;
use crate::config::GameConfig;
use crate::effect::{Effect, EffectKind, EffectLifetime};
use crate::env::{RngOracle, compute_seed, roll};
use crate::sign::{RoundOutcome, Sign};
use crate::state::Side;

/// One bound behavior plus its mutable bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitInstance {
    kind: TraitKind,
    streak: u32,
    last_player_sign: Option<Sign>,
    hardened: bool,
    dropped: bool,
}

impl TraitInstance {
    pub fn new(kind: TraitKind) -> Self {
        Self {
            kind,
            streak: 0,
            last_player_sign: None,
            hardened: false,
            dropped: false,
        }
    }

    pub fn kind(&self) -> &TraitKind {
        &self.kind
    }

    /// Current consecutive-sign count (for presentation/debugging).
    pub fn streak(&self) -> u32 {
        self.streak
    }
}

/// Something a trait decided to do; applied by the engine so hooks stay pure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraitReaction {
    DamagePlayer { amount: u32 },
    RegisterEffect(Effect),
    DropCurrency { coins: u32, favor: u32 },
}

/// Round facts handed to the post-damage hook.
pub struct RoundContext<'a> {
    pub outcome: RoundOutcome,
    pub player_max_health: u32,
    pub opponent_health: u32,
    pub opponent_max_health: u32,
    pub run_seed: u64,
    pub nonce: u64,
    pub rng: &'a dyn RngOracle,
}

/// The behaviors of the current opponent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSet {
    traits: ArrayVec<TraitInstance, { GameConfig::MAX_TRAITS }>,
}

impl BehaviorSet {
    /// Build the set from spawn-time configs. Excess traits beyond the cap
    /// are ignored.
    pub fn from_kinds(kinds: &[TraitKind]) -> Self {
        let mut set = Self::default();
        for kind in kinds {
            if set.traits.is_full() {
                break;
            }
            set.traits.push(TraitInstance::new(*kind));
        }
        set
    }

    pub fn clear(&mut self) {
        self.traits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitInstance> {
        self.traits.iter()
    }

    /// Observe the revealed signs before the round resolves.
    ///
    /// Streak counters grow on a repeated player sign and reset to one on
    /// any change; every trait records the player's latest sign.
    pub fn on_before_round(&mut self, player_sign: Sign, _opponent_sign: Sign) {
        for t in &mut self.traits {
            if matches!(t.kind, TraitKind::StreakPunisher { .. }) {
                if t.last_player_sign == Some(player_sign) {
                    t.streak += 1;
                } else {
                    t.streak = 1;
                }
            }
            t.last_player_sign = Some(player_sign);
        }
    }

    /// Act after damage has been applied for the round.
    pub fn on_after_damage(&mut self, ctx: &RoundContext<'_>) -> Vec<TraitReaction> {
        let mut reactions = Vec::new();
        for t in &mut self.traits {
            match t.kind {
                TraitKind::StreakPunisher {
                    required_consecutive,
                    percent_max_health,
                } => {
                    if t.streak >= required_consecutive {
                        reactions.push(TraitReaction::DamagePlayer {
                            amount: scale_rounded(ctx.player_max_health, percent_max_health),
                        });
                        t.streak = 0;
                    }
                }
                TraitKind::Harden {
                    threshold_percent,
                    reduction_percent,
                } => {
                    let below = ctx.opponent_health > 0
                        && ctx.opponent_health * 100 < threshold_percent * ctx.opponent_max_health;
                    if !t.hardened && below {
                        t.hardened = true;
                        reactions.push(TraitReaction::RegisterEffect(Effect::new(
                            EffectKind::IncomingReduction {
                                percent: reduction_percent,
                            },
                            EffectLifetime::RoomScoped,
                            Some(Side::Opponent),
                        )));
                    }
                }
                TraitKind::MinionPack {
                    count,
                    attack_chance,
                    damage,
                } => {
                    let mut total = 0;
                    for minion in 0..count {
                        let seed = compute_seed(
                            ctx.run_seed,
                            ctx.nonce,
                            Side::Opponent.index(),
                            roll::MINION_BASE + minion,
                        );
                        if ctx.rng.roll_d100(seed) <= attack_chance {
                            total += damage;
                        }
                    }
                    if total > 0 {
                        reactions.push(TraitReaction::DamagePlayer { amount: total });
                    }
                }
                TraitKind::Bounty { .. } | TraitKind::SignReader { .. } => {}
            }
        }
        reactions
    }

    /// Fired once the opponent's death is finalized.
    pub fn on_post_death(&mut self) -> Vec<TraitReaction> {
        let mut reactions = Vec::new();
        for t in &mut self.traits {
            if let TraitKind::Bounty { coins, favor } = t.kind {
                if !t.dropped {
                    t.dropped = true;
                    reactions.push(TraitReaction::DropCurrency { coins, favor });
                }
            }
        }
        reactions
    }

    /// Trait-driven sign choice, if any; `None` falls back to the caller's
    /// default strategy.
    pub fn choose_sign(&self, choice_roll: u32) -> Option<Sign> {
        self.traits.iter().find_map(|t| match t.kind {
            TraitKind::SignReader { chance } => t
                .last_player_sign
                .filter(|_| choice_roll <= chance)
                .map(|sign| sign.beaten_by()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    fn ctx<'a>(rng: &'a dyn RngOracle, opponent_health: u32) -> RoundContext<'a> {
        RoundContext {
            outcome: RoundOutcome::Win,
            player_max_health: 100,
            opponent_health,
            opponent_max_health: 50,
            run_seed: 7,
            nonce: 1,
            rng,
        }
    }

    #[test]
    fn streak_punisher_fires_once_then_resets() {
        let rng = PcgRng;
        let mut set = BehaviorSet::from_kinds(&[TraitKind::StreakPunisher {
            required_consecutive: 3,
            percent_max_health: 10,
        }]);

        // Rock, Rock: no punishment yet.
        for _ in 0..2 {
            set.on_before_round(Sign::Rock, Sign::Paper);
            assert!(set.on_after_damage(&ctx(&rng, 50)).is_empty());
        }

        // Third consecutive Rock triggers exactly one punishment.
        set.on_before_round(Sign::Rock, Sign::Paper);
        let reactions = set.on_after_damage(&ctx(&rng, 50));
        assert_eq!(
            reactions,
            vec![TraitReaction::DamagePlayer { amount: 10 }]
        );

        // The streak reset: a fourth Rock starts over at one.
        set.on_before_round(Sign::Rock, Sign::Paper);
        assert_eq!(set.iter().next().unwrap().streak(), 1);
        assert!(set.on_after_damage(&ctx(&rng, 50)).is_empty());
    }

    #[test]
    fn changing_sign_resets_the_streak() {
        let rng = PcgRng;
        let mut set = BehaviorSet::from_kinds(&[TraitKind::StreakPunisher {
            required_consecutive: 3,
            percent_max_health: 10,
        }]);

        set.on_before_round(Sign::Rock, Sign::Paper);
        set.on_before_round(Sign::Rock, Sign::Paper);
        set.on_before_round(Sign::Paper, Sign::Paper);
        set.on_before_round(Sign::Rock, Sign::Paper);
        assert!(set.on_after_damage(&ctx(&rng, 50)).is_empty());
    }

    #[test]
    fn harden_activates_exactly_once() {
        let rng = PcgRng;
        let mut set = BehaviorSet::from_kinds(&[TraitKind::Harden {
            threshold_percent: 50,
            reduction_percent: 30,
        }]);

        // Above threshold: nothing.
        assert!(set.on_after_damage(&ctx(&rng, 30)).is_empty());

        // Below half of 50 max health: armored state entered once.
        let reactions = set.on_after_damage(&ctx(&rng, 20));
        assert_eq!(reactions.len(), 1);
        assert!(matches!(reactions[0], TraitReaction::RegisterEffect(_)));

        // Health recovered above the threshold, then dropped again: no
        // second activation.
        assert!(set.on_after_damage(&ctx(&rng, 40)).is_empty());
        assert!(set.on_after_damage(&ctx(&rng, 10)).is_empty());
    }

    #[test]
    fn bounty_drops_exactly_once() {
        let mut set = BehaviorSet::from_kinds(&[TraitKind::Bounty { coins: 5, favor: 1 }]);

        let first = set.on_post_death();
        assert_eq!(first, vec![TraitReaction::DropCurrency { coins: 5, favor: 1 }]);
        assert!(set.on_post_death().is_empty());
    }

    #[test]
    fn sign_reader_counters_the_last_player_sign() {
        let mut set = BehaviorSet::from_kinds(&[TraitKind::SignReader { chance: 60 }]);

        // No observation yet: no override.
        assert_eq!(set.choose_sign(1), None);

        set.on_before_round(Sign::Rock, Sign::Paper);
        assert_eq!(set.choose_sign(60), Some(Sign::Paper));
        // Roll above the chance: fall back to the default strategy.
        assert_eq!(set.choose_sign(61), None);
    }
}
