//! Persistence collaborator adapter.
//!
//! The core only needs get/set semantics on named numeric fields: permanent
//! upgrade levels read at run start, and currency totals written after every
//! drop. [`ProfileStore`] is that contract; the match never depends on the
//! storage format behind it.
mod file;
mod memory;

pub use file::FileProfileStore;
pub use memory::InMemoryProfileStore;

use thiserror::Error;

/// Errors raised by a profile store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store io failure")]
    Io(#[from] std::io::Error),

    #[error("profile store contains invalid data")]
    Format(#[from] serde_json::Error),
}

/// Opaque named-numeric-field storage.
///
/// Store failures are never fatal to a match; callers log and continue.
pub trait ProfileStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError>;

    /// Add `delta` to a field, creating it at zero first. Returns the new
    /// value.
    fn add(&self, key: &str, delta: i64) -> Result<i64, StoreError>;
}

/// Well-known field names.
pub mod keys {
    /// Cross-run currency.
    pub const COINS: &str = "currency.coins";
    /// In-run currency banked for meta progression.
    pub const FAVOR: &str = "currency.favor";
    /// Flat max-health bonus applied to the player at run start.
    pub const UPGRADE_MAX_HEALTH: &str = "upgrade.max_health";
    /// Flat per-sign damage bonus applied to the player at run start.
    pub const UPGRADE_BASE_DAMAGE: &str = "upgrade.base_damage";
}
