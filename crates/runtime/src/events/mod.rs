//! Topic-based event routing between the match worker and its consumers.
mod bus;
mod types;

pub use bus::EventBus;
pub use types::{EffectEvent, Event, MatchEvent, RoundEvent, Topic};
