//! Owned oracle bundle handed to the match worker.

use roshambo_core::{DefaultTables, GameEnv, PcgRng, RngOracle, TablesOracle};

/// Owns the oracle implementations and lends them to the engine as a
/// [`GameEnv`] per operation.
pub struct OracleSet {
    rng: Box<dyn RngOracle>,
    tables: Box<dyn TablesOracle>,
}

impl OracleSet {
    pub fn new(rng: Box<dyn RngOracle>, tables: Box<dyn TablesOracle>) -> Self {
        Self { rng, tables }
    }

    /// Borrow the oracles as an engine environment.
    pub fn as_env(&self) -> GameEnv<'_> {
        GameEnv::with_all(self.rng.as_ref(), self.tables.as_ref())
    }
}

impl Default for OracleSet {
    fn default() -> Self {
        Self::new(Box::new(PcgRng), Box::new(DefaultTables))
    }
}
