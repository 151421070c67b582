use serde::{Deserialize, Serialize};

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Power-up activations normally allowed per round.
    pub uses_per_round: u32,

    /// Starting player health when no permanent upgrades apply.
    pub player_max_health: u32,

    /// Uniform per-sign base damage for a fresh player.
    pub player_base_damage: u32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum behavior traits bound to a single opponent.
    pub const MAX_TRAITS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_USES_PER_ROUND: u32 = 1;
    pub const DEFAULT_PLAYER_MAX_HEALTH: u32 = 100;
    pub const DEFAULT_PLAYER_BASE_DAMAGE: u32 = 10;

    pub fn new() -> Self {
        Self {
            uses_per_round: Self::DEFAULT_USES_PER_ROUND,
            player_max_health: Self::DEFAULT_PLAYER_MAX_HEALTH,
            player_base_damage: Self::DEFAULT_PLAYER_BASE_DAMAGE,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
