//! Phase-gated match operations.
//!
//! The [`MatchEngine`] is the authoritative reducer for [`MatchState`]. The
//! orchestrator calls one operation per state-machine edge and performs its
//! presentation waits *between* calls; the engine itself never waits and
//! never advances past a wait on its own. Every operation validates the
//! current phase first and returns a typed error instead of mutating on a
//! bad call.
mod errors;

pub use errors::EngineError;

use crate::behavior::{BehaviorSet, RoundContext, TraitReaction};
use crate::combat::{self, DamageReport, Reflection};
use crate::effect::{Effect, EffectHook, EffectId, EffectKind, EffectLifetime, RegisterOutcome};
use crate::env::GameEnv;
use crate::sign::{RoundOutcome, Sign};
use crate::state::{Combatant, MatchPhase, MatchState, RoomPlan, Side};

/// Outcome of spawning the next queued opponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnReport {
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    /// Opponents still queued behind this one in the current room.
    pub remaining_in_room: usize,
}

/// Outcome of resolving one round's damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundDamage {
    pub outcome: RoundOutcome,
    /// Side that took the main hit; `None` on a draw.
    pub struck: Option<Side>,
    pub report: Option<DamageReport>,
}

/// A trait reaction after the engine applied it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppliedReaction {
    PlayerStruck { amount: u32 },
    EffectRegistered { id: EffectId },
    CurrencyBanked { coins: u64, favor: u64 },
}

/// Outcome of closing a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundEndReport {
    /// Rounds completed so far, including this one.
    pub round: u32,
    pub reactions: Vec<AppliedReaction>,
    /// Effects that left the registry at the round boundary.
    pub expired: Vec<Effect>,
    pub dead: Option<Side>,
}

/// Where the match goes after a death completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStep {
    SpawnNext,
    RoomCleared,
    MatchOver { winner: Side },
}

/// Outcome of finalizing a death.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeathReport {
    pub side: Side,
    pub reactions: Vec<AppliedReaction>,
    pub next: NextStep,
}

/// What applying an effect did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Registered(RegisterOutcome),
    Healed { amount: u32 },
    BudgetGranted { count: u32, temporary: bool },
}

/// Authoritative reducer over one match's state.
pub struct MatchEngine<'a> {
    state: &'a mut MatchState,
}

impl<'a> MatchEngine<'a> {
    pub fn new(state: &'a mut MatchState) -> Self {
        Self { state }
    }

    fn invalid(&self, op: &'static str) -> EngineError {
        EngineError::InvalidPhase {
            op,
            phase: self.state.phase.label(),
        }
    }

    /// Build the next queued opponent and enter `Idle`.
    pub fn spawn_opponent(&mut self) -> Result<SpawnReport, EngineError> {
        if self.state.phase != MatchPhase::EnemySpawning {
            return Err(self.invalid("spawn_opponent"));
        }
        let spec = self
            .state
            .room_plan
            .next_opponent()
            .ok_or(EngineError::EmptyRoomPlan)?;

        // Stale opponent-owned effects never outlive their owner.
        self.state.effects.clear_owned_by(Side::Opponent);

        let combatant = Combatant::new(
            Side::Opponent,
            spec.name,
            spec.max_health,
            spec.base_damage,
            spec.dodge_chance,
            spec.crit_chance,
        );
        let report = SpawnReport {
            name: combatant.name.clone(),
            health: combatant.health,
            max_health: combatant.max_health,
            remaining_in_room: self.state.room_plan.remaining(),
        };
        self.state.behaviors = BehaviorSet::from_kinds(&spec.traits);
        self.state.opponent = Some(combatant);
        self.state.phase = MatchPhase::Idle;
        Ok(report)
    }

    /// Lock in both revealed signs. Only valid in `Idle`, so a second
    /// selection before the round finishes is rejected.
    pub fn select_signs(&mut self, player: Sign, opponent: Sign) -> Result<(), EngineError> {
        if self.state.phase != MatchPhase::Idle {
            return Err(self.invalid("select_signs"));
        }
        if self.state.opponent.is_none() {
            return Err(EngineError::MissingOpponent);
        }
        self.state.effects.broadcast(EffectHook::RoundStart);
        self.state.phase = MatchPhase::Selecting { player, opponent };
        Ok(())
    }

    /// Both reveal presentations finished: judge the outcome and let traits
    /// observe the revealed signs.
    pub fn reveal_complete(&mut self) -> Result<RoundOutcome, EngineError> {
        let MatchPhase::Selecting { player, opponent } = self.state.phase else {
            return Err(self.invalid("reveal_complete"));
        };
        let outcome = RoundOutcome::judge(player, opponent);
        self.state.behaviors.on_before_round(player, opponent);
        self.state.phase = MatchPhase::EvaluatingOutcome { player, opponent };
        Ok(outcome)
    }

    /// Run the damage pipeline for the losing side and apply the result.
    ///
    /// A draw applies no damage; the caller skips hit presentation and goes
    /// straight to [`MatchEngine::finish_round`].
    pub fn resolve_damage(&mut self, env: &GameEnv<'_>) -> Result<RoundDamage, EngineError> {
        let MatchPhase::EvaluatingOutcome { player, opponent } = self.state.phase else {
            return Err(self.invalid("resolve_damage"));
        };
        let outcome = RoundOutcome::judge(player, opponent);
        self.state.nonce += 1;

        let result = match outcome {
            RoundOutcome::Draw => RoundDamage {
                outcome,
                struck: None,
                report: None,
            },
            RoundOutcome::Win | RoundOutcome::Lose => {
                let (attacker_side, sign) = if outcome == RoundOutcome::Win {
                    (Side::Player, player)
                } else {
                    (Side::Opponent, opponent)
                };
                let defender_side = attacker_side.other();

                let (attacker, defender) = match attacker_side {
                    Side::Player => (
                        &self.state.player,
                        self.state
                            .opponent
                            .as_ref()
                            .ok_or(EngineError::MissingOpponent)?,
                    ),
                    Side::Opponent => (
                        self.state
                            .opponent
                            .as_ref()
                            .ok_or(EngineError::MissingOpponent)?,
                        &self.state.player,
                    ),
                };

                let report = combat::resolve_damage(
                    attacker,
                    defender,
                    sign,
                    &self.state.effects,
                    env,
                    self.state.run_seed,
                    self.state.nonce,
                )?;

                if let Some(defender) = self.state.combatant_mut(defender_side) {
                    defender.apply_damage(report.damage);
                }
                if let Some(attacker) = self.state.combatant_mut(attacker_side) {
                    attacker.temp_bonus_damage = 0;
                }
                for id in &report.consumed {
                    self.state.effects.remove(*id);
                }
                self.state.pending_reflection = report.reflection;

                RoundDamage {
                    outcome,
                    struck: Some(defender_side),
                    report: Some(report),
                }
            }
        };

        self.state.phase = MatchPhase::ApplyingDamage {
            player,
            opponent,
            outcome,
        };
        Ok(result)
    }

    /// Apply the staged counter-damage, if a reflect effect fired this
    /// round. Reflected damage bypasses the pipeline and clamps normally.
    pub fn apply_reflection(&mut self) -> Result<Option<Reflection>, EngineError> {
        if !matches!(self.state.phase, MatchPhase::ApplyingDamage { .. }) {
            return Err(self.invalid("apply_reflection"));
        }
        let Some(reflection) = self.state.pending_reflection.take() else {
            return Ok(None);
        };
        if let Some(target) = self.state.combatant_mut(reflection.against) {
            target.apply_damage(reflection.damage);
        }
        Ok(Some(reflection))
    }

    /// Close the round: post-damage trait hook, round-end broadcast, budget
    /// reset, death check.
    pub fn finish_round(&mut self, env: &GameEnv<'_>) -> Result<RoundEndReport, EngineError> {
        let MatchPhase::ApplyingDamage {
            player,
            opponent,
            outcome,
        } = self.state.phase
        else {
            return Err(self.invalid("finish_round"));
        };

        self.state.nonce += 1;
        let mut reactions = Vec::new();
        let opponent_stats = self
            .state
            .opponent
            .as_ref()
            .map(|o| (o.health, o.max_health));
        if let Some((opponent_health, opponent_max_health)) = opponent_stats {
            let ctx = RoundContext {
                outcome,
                player_max_health: self.state.player.max_health,
                opponent_health,
                opponent_max_health,
                run_seed: self.state.run_seed,
                nonce: self.state.nonce,
                rng: env.rng()?,
            };
            let raw = self.state.behaviors.on_after_damage(&ctx);
            reactions = self.apply_reactions(raw);
        }

        let expired = self.state.effects.broadcast(EffectHook::RoundEnd {
            player,
            opponent,
            outcome,
        });
        self.state.budget.reset_for_round();
        self.state.round += 1;

        // The round's loser is checked first; a doubly-lethal exchange
        // therefore finishes the opponent before the player.
        let opponent_dead = self
            .state
            .opponent
            .as_ref()
            .is_some_and(|o| !o.is_alive());
        let dead = if opponent_dead {
            Some(Side::Opponent)
        } else if !self.state.player.is_alive() {
            Some(Side::Player)
        } else {
            None
        };

        self.state.phase = match dead {
            Some(side) => MatchPhase::Dying { side },
            None => MatchPhase::Idle,
        };

        Ok(RoundEndReport {
            round: self.state.round,
            reactions,
            expired,
            dead,
        })
    }

    /// Death presentation finished: fire post-death hooks and pick the next
    /// step.
    pub fn complete_death(&mut self) -> Result<DeathReport, EngineError> {
        let MatchPhase::Dying { side } = self.state.phase else {
            return Err(self.invalid("complete_death"));
        };

        if side == Side::Player {
            // Run teardown: the registry does not outlive the run.
            self.state.effects.broadcast(EffectHook::Cleanup);
            self.state.phase = MatchPhase::MatchOver {
                winner: Side::Opponent,
            };
            return Ok(DeathReport {
                side,
                reactions: Vec::new(),
                next: NextStep::MatchOver {
                    winner: Side::Opponent,
                },
            });
        }

        let raw = self.state.behaviors.on_post_death();
        let reactions = self.apply_reactions(raw);

        self.state.behaviors.clear();
        self.state.opponent = None;
        self.state.effects.clear_owned_by(Side::Opponent);

        let next = if self.state.room_plan.is_empty() {
            self.state.phase = MatchPhase::RoomTransition;
            NextStep::RoomCleared
        } else {
            self.state.phase = MatchPhase::EnemySpawning;
            NextStep::SpawnNext
        };

        Ok(DeathReport {
            side,
            reactions,
            next,
        })
    }

    /// Stage an out-of-turn power-up activation.
    pub fn begin_power_up(&mut self, effect: Effect) -> Result<(), EngineError> {
        if self.state.phase != MatchPhase::Idle {
            return Err(self.invalid("begin_power_up"));
        }
        if !self.state.budget.can_activate() {
            return Err(EngineError::BudgetExhausted);
        }
        self.state.pending_power_up = Some(effect);
        self.state.phase = MatchPhase::PowerUpActivation;
        Ok(())
    }

    /// Activation presentation finished: apply the staged power-up exactly
    /// once and charge the budget.
    pub fn complete_power_up(&mut self) -> Result<InstallOutcome, EngineError> {
        if self.state.phase != MatchPhase::PowerUpActivation {
            return Err(self.invalid("complete_power_up"));
        }
        let effect = self
            .state
            .pending_power_up
            .take()
            .ok_or(EngineError::NoPendingPowerUp)?;
        let outcome = self.grant_effect(effect);
        self.state.budget.mark_used();
        self.state.phase = MatchPhase::Idle;
        Ok(outcome)
    }

    /// Apply an acquired effect outside the activation flow (reward panels,
    /// trait reactions). Instant kinds apply immediately; everything else
    /// registers, and passives re-fold the permanent bonus fields.
    pub fn grant_effect(&mut self, effect: Effect) -> InstallOutcome {
        match effect.kind {
            EffectKind::Heal { amount } => {
                let side = effect.owner.unwrap_or(Side::Player);
                let healed = self
                    .state
                    .combatant_mut(side)
                    .map(|c| c.heal(amount))
                    .unwrap_or(0);
                InstallOutcome::Healed { amount: healed }
            }
            EffectKind::BonusUses { count, temporary } => {
                self.state.budget.grant_bonus(count, temporary);
                InstallOutcome::BudgetGranted { count, temporary }
            }
            _ => {
                let is_passive = effect.lifetime == EffectLifetime::Passive;
                let outcome = self.state.effects.register(effect);
                if is_passive {
                    self.recompute_passives();
                }
                InstallOutcome::Registered(outcome)
            }
        }
    }

    /// Room boundary: drop room-scoped effects, re-fold passives from
    /// scratch, and fire the room-start hook. Installing `next_room` moves
    /// the match on to spawning; until then the reward interlude holds.
    pub fn room_transition(
        &mut self,
        next_room: Option<RoomPlan>,
    ) -> Result<Vec<Effect>, EngineError> {
        if self.state.phase != MatchPhase::RoomTransition {
            return Err(self.invalid("room_transition"));
        }
        let removed = self.state.effects.clear_room_scoped();
        self.recompute_passives();
        self.state.effects.broadcast(EffectHook::RoomStart);

        if let Some(plan) = next_room {
            self.state.room += 1;
            self.state.room_plan = plan;
            self.state.phase = MatchPhase::EnemySpawning;
        }
        Ok(removed)
    }

    /// Rebuild both combatants' permanent passive bonuses from the registry.
    ///
    /// Idempotent recomputation, not accumulation: calling this any number
    /// of times yields the same fields.
    pub fn recompute_passives(&mut self) {
        self.state.player.clear_passives();
        if let Some(opponent) = self.state.opponent.as_mut() {
            opponent.clear_passives();
        }

        let folds: Vec<(Option<Side>, EffectKind, u32)> = self
            .state
            .effects
            .passive_effects()
            .map(|e| (e.owner, e.kind, e.stacks()))
            .collect();

        for (owner, kind, stacks) in folds {
            for side in [Side::Player, Side::Opponent] {
                if owner.is_some_and(|o| o != side) {
                    continue;
                }
                let Some(combatant) = self.state.combatant_mut(side) else {
                    continue;
                };
                match kind {
                    EffectKind::FlatDamage { amount, sign } => {
                        combatant.passive_flat.add(sign, amount * stacks);
                    }
                    EffectKind::DamagePercent { percent } => {
                        combatant.passive_percent += percent * stacks;
                    }
                    EffectKind::MaxHealthUp { amount } => {
                        combatant.passive_max_health += amount * stacks;
                    }
                    _ => {}
                }
            }
        }

        self.state.player.refresh_max_health();
        if let Some(opponent) = self.state.opponent.as_mut() {
            opponent.refresh_max_health();
        }
    }

    fn apply_reactions(&mut self, reactions: Vec<TraitReaction>) -> Vec<AppliedReaction> {
        let mut applied = Vec::new();
        for reaction in reactions {
            match reaction {
                TraitReaction::DamagePlayer { amount } => {
                    let dealt = self.state.player.apply_damage(amount);
                    applied.push(AppliedReaction::PlayerStruck { amount: dealt });
                }
                TraitReaction::RegisterEffect(effect) => {
                    if let InstallOutcome::Registered(outcome) = self.grant_effect(effect) {
                        applied.push(AppliedReaction::EffectRegistered { id: outcome.id() });
                    }
                }
                TraitReaction::DropCurrency { coins, favor } => {
                    self.state.coins_earned += coins as u64;
                    self.state.favor_earned += favor as u64;
                    applied.push(AppliedReaction::CurrencyBanked {
                        coins: coins as u64,
                        favor: favor as u64,
                    });
                }
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::TraitKind;
    use crate::config::GameConfig;
    use crate::env::{DefaultTables, PcgRng};
    use crate::state::{OpponentSpec, SignDamage};

    fn test_env<'a>(rng: &'a PcgRng, tables: &'a DefaultTables) -> GameEnv<'a> {
        GameEnv::with_all(rng, tables)
    }

    fn opponent(damage: u32) -> OpponentSpec {
        OpponentSpec::new("grunt", 30, SignDamage::uniform(damage))
    }

    fn fresh_state(player_health: u32, spec: OpponentSpec) -> MatchState {
        let config = GameConfig::default();
        let player = Combatant::new(
            Side::Player,
            "player",
            player_health,
            SignDamage::uniform(10),
            0,
            0,
        );
        MatchState::new(player, RoomPlan::new([spec]), 42, &config)
    }

    /// Drive one full round through the engine, player revealing `player`
    /// against `opponent`.
    fn play_round(
        state: &mut MatchState,
        env: &GameEnv<'_>,
        player: Sign,
        opponent: Sign,
    ) -> (RoundDamage, RoundEndReport) {
        let mut engine = MatchEngine::new(state);
        engine.select_signs(player, opponent).unwrap();
        engine.reveal_complete().unwrap();
        let damage = engine.resolve_damage(env).unwrap();
        engine.apply_reflection().unwrap();
        let end = engine.finish_round(env).unwrap();
        (damage, end)
    }

    #[test]
    fn win_damages_the_opponent_only() {
        let rng = PcgRng;
        let tables = DefaultTables;
        let env = test_env(&rng, &tables);
        let mut state = fresh_state(100, opponent(5));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        let (damage, end) = play_round(&mut state, &env, Sign::Rock, Sign::Scissors);
        assert_eq!(damage.outcome, RoundOutcome::Win);
        assert_eq!(damage.struck, Some(Side::Opponent));
        assert_eq!(state.opponent.as_ref().unwrap().health, 20);
        assert_eq!(state.player.health, 100);
        assert_eq!(end.dead, None);
        assert_eq!(state.phase, MatchPhase::Idle);
        assert_eq!(state.round, 1);
    }

    #[test]
    fn draw_applies_no_damage_and_returns_to_idle() {
        let rng = PcgRng;
        let tables = DefaultTables;
        let env = test_env(&rng, &tables);
        let mut state = fresh_state(100, opponent(5));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        let (damage, end) = play_round(&mut state, &env, Sign::Paper, Sign::Paper);
        assert_eq!(damage.outcome, RoundOutcome::Draw);
        assert_eq!(damage.struck, None);
        assert_eq!(state.player.health, 100);
        assert_eq!(state.opponent.as_ref().unwrap().health, 30);
        assert_eq!(end.dead, None);
        assert_eq!(state.phase, MatchPhase::Idle);
    }

    #[test]
    fn lethal_overkill_clamps_to_zero_and_dies_once() {
        // 20 health against a 25-damage hit: health stops at 0, one death.
        let rng = PcgRng;
        let tables = DefaultTables;
        let env = test_env(&rng, &tables);
        let mut state = fresh_state(20, opponent(25));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        let (_, end) = play_round(&mut state, &env, Sign::Rock, Sign::Paper);
        assert_eq!(state.player.health, 0);
        assert_eq!(end.dead, Some(Side::Player));
        assert_eq!(state.phase, MatchPhase::Dying { side: Side::Player });

        let death = {
            let mut engine = MatchEngine::new(&mut state);
            engine.complete_death().unwrap()
        };
        assert_eq!(
            death.next,
            NextStep::MatchOver {
                winner: Side::Opponent
            }
        );
        assert_eq!(
            state.phase,
            MatchPhase::MatchOver {
                winner: Side::Opponent
            }
        );

        // The death sequence ran exactly once; a second completion is a
        // phase error, not a second death.
        let mut engine = MatchEngine::new(&mut state);
        assert!(engine.complete_death().is_err());
    }

    #[test]
    fn selection_is_rejected_outside_idle() {
        let mut state = fresh_state(100, opponent(5));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        let mut engine = MatchEngine::new(&mut state);
        engine.select_signs(Sign::Rock, Sign::Paper).unwrap();
        let second = engine.select_signs(Sign::Rock, Sign::Paper);
        assert!(matches!(
            second,
            Err(EngineError::InvalidPhase { op: "select_signs", .. })
        ));
    }

    #[test]
    fn dead_opponent_advances_to_room_transition_and_drops_bounty() {
        let rng = PcgRng;
        let tables = DefaultTables;
        let env = test_env(&rng, &tables);
        let spec = OpponentSpec::new("bandit", 10, SignDamage::uniform(5))
            .with_trait(TraitKind::Bounty { coins: 7, favor: 2 });
        let mut state = fresh_state(100, spec);
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        let (_, end) = play_round(&mut state, &env, Sign::Scissors, Sign::Paper);
        assert_eq!(end.dead, Some(Side::Opponent));

        let death = {
            let mut engine = MatchEngine::new(&mut state);
            engine.complete_death().unwrap()
        };
        assert_eq!(death.next, NextStep::RoomCleared);
        assert_eq!(state.coins_earned, 7);
        assert_eq!(state.favor_earned, 2);
        assert_eq!(state.phase, MatchPhase::RoomTransition);
        assert!(state.opponent.is_none());
    }

    #[test]
    fn power_up_flow_is_budget_gated() {
        let mut state = fresh_state(100, opponent(5));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();
        state.player.apply_damage(50);

        let heal = Effect::new(
            EffectKind::Heal { amount: 20 },
            EffectLifetime::OneShot,
            Some(Side::Player),
        );

        let mut engine = MatchEngine::new(&mut state);
        engine.begin_power_up(heal.clone()).unwrap();
        let outcome = engine.complete_power_up().unwrap();
        assert_eq!(outcome, InstallOutcome::Healed { amount: 20 });
        assert_eq!(state.player.health, 70);
        assert_eq!(state.phase, MatchPhase::Idle);

        // Budget spent: the next attempt this round is refused.
        let mut engine = MatchEngine::new(&mut state);
        assert_eq!(
            engine.begin_power_up(heal),
            Err(EngineError::BudgetExhausted)
        );
    }

    #[test]
    fn room_transition_clears_room_scoped_and_refolds_passives() {
        let rng = PcgRng;
        let tables = DefaultTables;
        let env = test_env(&rng, &tables);
        let mut state = fresh_state(100, opponent(10));
        MatchEngine::new(&mut state).spawn_opponent().unwrap();

        {
            let mut engine = MatchEngine::new(&mut state);
            engine.grant_effect(Effect::new(
                EffectKind::FlatDamage { amount: 3, sign: None },
                EffectLifetime::RoomScoped,
                Some(Side::Player),
            ));
            engine.grant_effect(Effect::new(
                EffectKind::MaxHealthUp { amount: 25 },
                EffectLifetime::Passive,
                Some(Side::Player),
            ));
        }
        assert_eq!(state.player.max_health, 125);

        // Kill the opponent to clear the room.
        let (_, end) = play_round(&mut state, &env, Sign::Rock, Sign::Scissors);
        assert_eq!(end.dead, None);
        let (_, end) = play_round(&mut state, &env, Sign::Rock, Sign::Scissors);
        assert_eq!(end.dead, None);
        let (_, end) = play_round(&mut state, &env, Sign::Rock, Sign::Scissors);
        assert_eq!(end.dead, Some(Side::Opponent));
        MatchEngine::new(&mut state).complete_death().unwrap();

        let removed = {
            let mut engine = MatchEngine::new(&mut state);
            engine
                .room_transition(Some(RoomPlan::new([opponent(5)])))
                .unwrap()
        };
        assert_eq!(removed.len(), 1);
        // The passive survived the re-fold.
        assert_eq!(state.player.max_health, 125);
        assert_eq!(state.room, 2);
        assert_eq!(state.phase, MatchPhase::EnemySpawning);
    }
}
