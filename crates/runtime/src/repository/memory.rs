//! In-memory profile store for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{ProfileStore, StoreError};

/// Keeps fields in a mutex-guarded map; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    values: Mutex<HashMap<String, i64>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.lock().get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn add(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut values = self.lock();
        let entry = values.entry(key.to_string()).or_insert(0);
        *entry += delta;
        Ok(*entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_creates_missing_fields_at_zero() {
        let store = InMemoryProfileStore::new();
        assert_eq!(store.get("currency.coins").unwrap(), None);
        assert_eq!(store.add("currency.coins", 5).unwrap(), 5);
        assert_eq!(store.add("currency.coins", 3).unwrap(), 8);
        assert_eq!(store.get("currency.coins").unwrap(), Some(8));
    }
}
