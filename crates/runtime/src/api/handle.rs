//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! playing rounds, activating power-ups, feeding presentation signals back
//! in, and streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use roshambo_core::{Effect, EffectView, InstallOutcome, MatchState, RoomPlan, Sign};

use super::errors::{Result, RuntimeError};
use super::reports::{PowerUpReport, RoundReport};
use super::signals::PresentationSignal;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime.
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    events: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, events: EventBus) -> Self {
        Self { command_tx, events }
    }

    /// Play one full round with the player's chosen sign.
    ///
    /// Resolves once the round, including any death sequence, has settled.
    /// Returns an error without advancing the match when a round is already
    /// in flight.
    pub async fn select_sign(&self, sign: Sign) -> Result<RoundReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::SelectSign {
                sign,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Activate a power-up outside the normal turn. Budget-gated.
    pub async fn activate_power_up(&self, effect: Effect) -> Result<PowerUpReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::ActivatePowerUp {
                effect,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Apply an acquired effect (reward panel pickups) without charging the
    /// per-round usage budget.
    pub async fn grant_effect(&self, effect: Effect) -> Result<InstallOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::GrantEffect {
                effect,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Install the next room after a reward interlude.
    pub async fn start_room(&self, plan: RoomPlan) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::StartRoom {
                plan,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Report an animation completion from the presentation layer.
    pub async fn signal(&self, signal: PresentationSignal) -> Result<()> {
        self.command_tx
            .send(Command::Signal(signal))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Query the current match state (read-only snapshot). Served even while
    /// a round is suspended on presentation.
    pub async fn query_state(&self) -> Result<MatchState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::QueryState { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Active effects with icon and duration-badge data, for the HUD.
    pub async fn active_effects(&self) -> Result<Vec<EffectView>> {
        Ok(self.query_state().await?.effects.views())
    }

    /// Whether the power-up button should currently be enabled.
    pub async fn can_activate(&self) -> Result<bool> {
        Ok(self.query_state().await?.budget.can_activate())
    }

    /// Subscribe to events from a specific topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage.
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }
}
