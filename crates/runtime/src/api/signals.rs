//! Completion signals consumed from the presentation layer.

use serde::{Deserialize, Serialize};

use roshambo_core::Side;

/// One-shot notifications the match waits on. The presentation layer sends
/// each through [`crate::RuntimeHandle::signal`] when the corresponding
/// animation finishes; every wait is timeout-bound so a dropped signal only
/// delays the match instead of hanging it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationSignal {
    RevealComplete(Side),
    HitComplete(Side),
    DeathComplete(Side),
    ActivationComplete,
}
