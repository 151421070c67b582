//! Match worker that owns the authoritative [`MatchState`].
//!
//! Receives commands from [`crate::RuntimeHandle`], drives rounds through
//! [`MatchEngine`], and publishes events for the presentation layer. The
//! worker is where the match's three suspension points live: reveal, hit,
//! and death presentation each block the round sequence until the matching
//! [`PresentationSignal`] arrives or the bounded wait expires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use roshambo_core::env::roll;
use roshambo_core::{
    AppliedReaction, Effect, InstallOutcome, MatchEngine, MatchState, NextStep, RegisterOutcome,
    RoomPlan, RoundDamage, Side, Sign, compute_seed,
};

use crate::api::{OpponentStrategy, PowerUpReport, PresentationSignal, Result, RoundReport,
    RuntimeError};
use crate::events::{EffectEvent, Event, EventBus, MatchEvent, RoundEvent};
use crate::oracle::OracleSet;
use crate::repository::{ProfileStore, keys};

/// Commands that can be sent to the match worker.
pub(crate) enum Command {
    /// Play one full round with the player's chosen sign. The reply arrives
    /// once the round, including any death sequence, has fully resolved.
    SelectSign {
        sign: Sign,
        reply: oneshot::Sender<Result<RoundReport>>,
    },
    /// Activate a power-up outside the normal turn.
    ActivatePowerUp {
        effect: Effect,
        reply: oneshot::Sender<Result<PowerUpReport>>,
    },
    /// Apply an acquired effect without charging the usage budget.
    GrantEffect {
        effect: Effect,
        reply: oneshot::Sender<Result<InstallOutcome>>,
    },
    /// Install the next room after a reward interlude.
    StartRoom {
        plan: RoomPlan,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Query the current match state (read-only snapshot).
    QueryState { reply: oneshot::Sender<MatchState> },
    /// Presentation-layer completion signal.
    Signal(PresentationSignal),
}

/// Background task that processes match commands.
pub(crate) struct MatchWorker {
    state: MatchState,
    oracles: OracleSet,
    strategy: Box<dyn OpponentStrategy>,
    store: Arc<dyn ProfileStore>,
    command_rx: mpsc::Receiver<Command>,
    events: EventBus,
    signal_timeout: Duration,
}

impl MatchWorker {
    pub(crate) fn new(
        state: MatchState,
        oracles: OracleSet,
        strategy: Box<dyn OpponentStrategy>,
        store: Arc<dyn ProfileStore>,
        command_rx: mpsc::Receiver<Command>,
        events: EventBus,
        signal_timeout: Duration,
    ) -> Self {
        Self {
            state,
            oracles,
            strategy,
            store,
            command_rx,
            events,
            signal_timeout,
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        if let Err(error) = self.spawn_current_opponent() {
            warn!(%error, "no opponent available at match start");
        }

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SelectSign { sign, reply } => {
                let result = self.play_round(sign).await;
                let _ = reply.send(result);
            }
            Command::ActivatePowerUp { effect, reply } => {
                let result = self.activate_power_up(effect).await;
                let _ = reply.send(result);
            }
            Command::GrantEffect { effect, reply } => {
                let outcome = MatchEngine::new(&mut self.state).grant_effect(effect);
                self.publish_install(&outcome);
                let _ = reply.send(Ok(outcome));
            }
            Command::StartRoom { plan, reply } => {
                let result = self.start_room(plan);
                let _ = reply.send(result);
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::Signal(signal) => {
                debug!(?signal, "signal arrived outside an active wait; ignored");
            }
        }
    }

    // ========================================================================
    // Round sequence
    // ========================================================================

    /// Drive one round from sign lock-in to its settled end phase.
    async fn play_round(&mut self, player_sign: Sign) -> Result<RoundReport> {
        let opponent_sign = self.choose_opponent_sign();

        MatchEngine::new(&mut self.state).select_signs(player_sign, opponent_sign)?;

        let round = self.state.round + 1;
        self.events.publish(Event::Round(RoundEvent::RevealRequested {
            round,
            player: player_sign,
            opponent: opponent_sign,
        }));
        self.await_reveals().await;

        let outcome = MatchEngine::new(&mut self.state).reveal_complete()?;
        self.events
            .publish(Event::Round(RoundEvent::OutcomeJudged { round, outcome }));

        let damage = {
            let env = self.oracles.as_env();
            MatchEngine::new(&mut self.state).resolve_damage(&env)?
        };
        self.present_main_hit(&damage).await;

        let reflection = MatchEngine::new(&mut self.state).apply_reflection()?;
        let mut reflection_damage = None;
        if let Some(reflection) = reflection {
            reflection_damage = Some(reflection.damage);
            self.events.publish(Event::Round(RoundEvent::ReflectionApplied {
                side: reflection.against,
                damage: reflection.damage,
            }));
            self.events.publish(Event::Round(RoundEvent::HitRequested {
                side: reflection.against,
                damage: reflection.damage,
                critical: false,
            }));
            self.await_signal(
                PresentationSignal::HitComplete(reflection.against),
                "reflection hit animation",
            )
            .await;
        }

        let end = {
            let env = self.oracles.as_env();
            MatchEngine::new(&mut self.state).finish_round(&env)?
        };
        for effect in &end.expired {
            self.events
                .publish(Event::Effect(EffectEvent::Expired { id: effect.id }));
        }
        self.publish_reactions(&end.reactions);
        self.events.publish(Event::Round(RoundEvent::RoundEnded {
            round: end.round,
            dead: end.dead,
        }));

        if let Some(side) = end.dead {
            self.run_death_sequence(side).await?;
        }

        let mut report = RoundReport {
            round: end.round,
            outcome,
            struck: damage.struck,
            damage: 0,
            dodged: false,
            critical: false,
            reflection_damage,
            dead: end.dead,
            phase: self.state.phase,
        };
        if let Some(dr) = &damage.report {
            report.damage = dr.damage;
            report.dodged = dr.dodged;
            report.critical = dr.critical;
        }
        Ok(report)
    }

    /// Traits may dictate the opponent's sign; otherwise the configured
    /// strategy chooses.
    fn choose_opponent_sign(&self) -> Sign {
        let choice_roll = match self.oracles.as_env().rng() {
            Ok(rng) => rng.roll_d100(compute_seed(
                self.state.run_seed,
                self.state.round as u64 + 1,
                Side::Opponent.index(),
                roll::SIGN_CHOICE,
            )),
            Err(_) => 100,
        };
        self.state
            .behaviors
            .choose_sign(choice_roll)
            .unwrap_or_else(|| self.strategy.choose(&self.state))
    }

    async fn present_main_hit(&mut self, damage: &RoundDamage) {
        let Some(report) = &damage.report else {
            return;
        };
        for id in &report.consumed {
            self.events
                .publish(Event::Effect(EffectEvent::Consumed { id: *id }));
        }
        let Some(struck) = damage.struck else {
            return;
        };
        if report.dodged {
            self.events
                .publish(Event::Round(RoundEvent::Dodged { side: struck }));
            return;
        }
        self.events.publish(Event::Round(RoundEvent::HitRequested {
            side: struck,
            damage: report.damage,
            critical: report.critical,
        }));
        self.await_signal(PresentationSignal::HitComplete(struck), "hit animation")
            .await;
    }

    async fn run_death_sequence(&mut self, side: Side) -> Result<()> {
        self.events
            .publish(Event::Match(MatchEvent::DeathRequested { side }));
        self.await_signal(PresentationSignal::DeathComplete(side), "death animation")
            .await;

        let death = MatchEngine::new(&mut self.state).complete_death()?;
        self.publish_reactions(&death.reactions);

        match death.next {
            NextStep::SpawnNext => self.spawn_current_opponent()?,
            NextStep::RoomCleared => {
                // Run the cleanup half of the transition now; the reward
                // interlude holds until the next room is installed.
                let removed = MatchEngine::new(&mut self.state).room_transition(None)?;
                for effect in removed {
                    self.events
                        .publish(Event::Effect(EffectEvent::Expired { id: effect.id }));
                }
                self.events.publish(Event::Match(MatchEvent::RoomCleared {
                    room: self.state.room,
                }));
            }
            NextStep::MatchOver { winner } => {
                self.events
                    .publish(Event::Match(MatchEvent::MatchOver { winner }));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Out-of-turn operations
    // ========================================================================

    async fn activate_power_up(&mut self, effect: Effect) -> Result<PowerUpReport> {
        MatchEngine::new(&mut self.state).begin_power_up(effect)?;
        self.events
            .publish(Event::Match(MatchEvent::ActivationRequested));
        self.await_signal(
            PresentationSignal::ActivationComplete,
            "activation animation",
        )
        .await;

        let outcome = MatchEngine::new(&mut self.state).complete_power_up()?;
        self.publish_install(&outcome);
        let can_activate = self.state.budget.can_activate();
        self.events
            .publish(Event::Effect(EffectEvent::BudgetChanged { can_activate }));
        Ok(PowerUpReport {
            outcome,
            can_activate,
        })
    }

    fn start_room(&mut self, plan: RoomPlan) -> Result<()> {
        MatchEngine::new(&mut self.state).room_transition(Some(plan))?;
        self.spawn_current_opponent()
    }

    fn spawn_current_opponent(&mut self) -> Result<()> {
        let report = MatchEngine::new(&mut self.state).spawn_opponent()?;
        self.events.publish(Event::Match(MatchEvent::OpponentSpawned {
            name: report.name,
            health: report.health,
            max_health: report.max_health,
        }));
        Ok(())
    }

    // ========================================================================
    // Bounded waits
    // ========================================================================

    /// Wait until both sides report reveal completion. Commands other than
    /// signals are rejected (or served, for read-only queries) while the
    /// round is suspended.
    async fn await_reveals(&mut self) {
        let mut pending = [true, true];
        let deadline = tokio::time::Instant::now() + self.signal_timeout;

        while pending.iter().any(|waiting| *waiting) {
            match tokio::time::timeout_at(deadline, self.command_rx.recv()).await {
                Ok(Some(Command::Signal(PresentationSignal::RevealComplete(side)))) => {
                    pending[side.index() as usize] = false;
                }
                Ok(Some(Command::Signal(signal))) => {
                    debug!(?signal, "unexpected signal while awaiting reveals");
                }
                Ok(Some(other)) => self.reject_busy(other),
                Ok(None) => return,
                Err(_) => {
                    warn!("timed out waiting for reveal animations; forcing progress");
                    return;
                }
            }
        }
    }

    /// Wait for one specific signal, with the same rejection rules.
    async fn await_signal(&mut self, expected: PresentationSignal, what: &'static str) {
        let deadline = tokio::time::Instant::now() + self.signal_timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.command_rx.recv()).await {
                Ok(Some(Command::Signal(signal))) if signal == expected => return,
                Ok(Some(Command::Signal(signal))) => {
                    debug!(?signal, %what, "unexpected signal while suspended");
                }
                Ok(Some(other)) => self.reject_busy(other),
                Ok(None) => return,
                Err(_) => {
                    warn!(%what, "timed out waiting for presentation; forcing progress");
                    return;
                }
            }
        }
    }

    /// Input arriving while the round is suspended: read-only queries are
    /// served, everything else is refused without advancing the match.
    fn reject_busy(&mut self, cmd: Command) {
        match cmd {
            Command::SelectSign { reply, .. } => {
                let _ = reply.send(Err(RuntimeError::RoundInProgress));
            }
            Command::ActivatePowerUp { reply, .. } => {
                let _ = reply.send(Err(RuntimeError::RoundInProgress));
            }
            Command::GrantEffect { reply, .. } => {
                let _ = reply.send(Err(RuntimeError::RoundInProgress));
            }
            Command::StartRoom { reply, .. } => {
                let _ = reply.send(Err(RuntimeError::RoundInProgress));
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::Signal(_) => {}
        }
    }

    // ========================================================================
    // Event and persistence fan-out
    // ========================================================================

    fn publish_install(&self, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::Registered(RegisterOutcome::Added(id)) => {
                let (icon, owner) = self
                    .state
                    .effects
                    .get(*id)
                    .map(|e| (e.kind.icon().to_string(), e.owner))
                    .unwrap_or_default();
                self.events.publish(Event::Effect(EffectEvent::Registered {
                    id: *id,
                    icon,
                    owner,
                }));
            }
            InstallOutcome::Registered(RegisterOutcome::Stacked { id, stacks }) => {
                self.events.publish(Event::Effect(EffectEvent::Stacked {
                    id: *id,
                    stacks: *stacks,
                }));
            }
            InstallOutcome::Healed { .. } | InstallOutcome::BudgetGranted { .. } => {}
        }
    }

    fn publish_reactions(&self, reactions: &[AppliedReaction]) {
        for reaction in reactions {
            match reaction {
                AppliedReaction::PlayerStruck { amount } => {
                    self.events.publish(Event::Round(RoundEvent::PunishmentApplied {
                        amount: *amount,
                    }));
                }
                AppliedReaction::EffectRegistered { id } => {
                    let (icon, owner) = self
                        .state
                        .effects
                        .get(*id)
                        .map(|e| (e.kind.icon().to_string(), e.owner))
                        .unwrap_or_default();
                    self.events.publish(Event::Effect(EffectEvent::Registered {
                        id: *id,
                        icon,
                        owner,
                    }));
                }
                AppliedReaction::CurrencyBanked { coins, favor } => {
                    self.bank_currency(*coins, *favor);
                }
            }
        }
    }

    /// Write a currency drop through to the profile store. Store failures
    /// are logged, never fatal to the match.
    fn bank_currency(&self, coins: u64, favor: u64) {
        if coins > 0 {
            if let Err(error) = self.store.add(keys::COINS, coins as i64) {
                warn!(%error, "failed to persist coin drop");
            }
        }
        if favor > 0 {
            if let Err(error) = self.store.add(keys::FAVOR, favor as i64) {
                warn!(%error, "failed to persist favor drop");
            }
        }
        self.events
            .publish(Event::Effect(EffectEvent::CurrencyDropped { coins, favor }));
    }
}
