//! Read-only collaborators injected into the engine.
//!
//! The [`GameEnv`] aggregate bundles the RNG and balance-table oracles so the
//! engine and damage pipeline can reach everything they need without hard
//! coupling to concrete implementations. A missing oracle is a recoverable
//! condition surfaced as [`OracleError`], never a panic.
mod error;
mod rng;
mod tables;

pub use error::OracleError;
pub use rng::{PcgRng, RngOracle, compute_seed, roll};
pub use tables::{CombatTables, DefaultTables, TablesOracle};

/// Aggregates the read-only oracles required by the engine.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    rng: Option<&'a dyn RngOracle>,
    tables: Option<&'a dyn TablesOracle>,
}

impl<'a> GameEnv<'a> {
    pub fn new(
        rng: Option<&'a dyn RngOracle>,
        tables: Option<&'a dyn TablesOracle>,
    ) -> Self {
        Self { rng, tables }
    }

    pub fn with_all(rng: &'a dyn RngOracle, tables: &'a dyn TablesOracle) -> Self {
        Self::new(Some(rng), Some(tables))
    }

    pub fn empty() -> Self {
        Self {
            rng: None,
            tables: None,
        }
    }

    /// Returns the RNG oracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Returns the balance-tables oracle, or an error if not available.
    pub fn tables(&self) -> Result<&'a dyn TablesOracle, OracleError> {
        self.tables.ok_or(OracleError::TablesNotAvailable)
    }
}
