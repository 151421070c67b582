//! Damage computation.
mod damage;

pub use damage::{DamageReport, Reflection, resolve_damage, scale_rounded};
