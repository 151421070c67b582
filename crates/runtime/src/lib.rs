//! Runtime orchestration for the deterministic match simulation.
//!
//! This crate wires the pure rules from `roshambo-core` into an async
//! driver: a worker task owns the authoritative [`roshambo_core::MatchState`],
//! a cloneable [`RuntimeHandle`] carries commands and presentation signals in,
//! and a topic-based [`EventBus`] carries reveal/hit/death requests out to
//! whatever presentation layer is attached. Every wait on the presentation
//! layer is bounded; a missing signal is logged and progress is forced.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] adapts the persistence collaborator
//! - `workers` keeps the match-driving task internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    FixedSignProvider, FixedStrategy, OpponentStrategy, PowerUpReport, PresentationSignal,
    RandomStrategy, Result, RoundReport, RuntimeError, RuntimeHandle, SeededStrategy,
    SignProvider,
};
pub use events::{EffectEvent, Event, EventBus, MatchEvent, RoundEvent, Topic};
pub use oracle::OracleSet;
pub use repository::{
    FileProfileStore, InMemoryProfileStore, ProfileStore, StoreError, keys,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
