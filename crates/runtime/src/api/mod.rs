//! Client-facing runtime API.
mod errors;
mod handle;
mod providers;
mod reports;
mod signals;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
pub use providers::{
    FixedSignProvider, FixedStrategy, OpponentStrategy, RandomStrategy, SeededStrategy,
    SignProvider,
};
pub use reports::{PowerUpReport, RoundReport};
pub use signals::PresentationSignal;
