//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, the engine, and the profile
//! store so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use roshambo_core::EngineError;

use crate::repository::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("player sign provider not set")]
    ProviderNotSet,

    #[error("runtime requires an initial room plan before building")]
    MissingRoomPlan,

    #[error("match worker command channel closed")]
    CommandChannelClosed,

    #[error("match worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("match worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("a round is already in progress")]
    RoundInProgress,

    #[error("waiting for the next room to be installed")]
    AwaitingNextRoom,

    #[error("the match is over")]
    MatchFinished,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
