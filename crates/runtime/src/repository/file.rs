//! JSON-file-backed profile store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ProfileStore, StoreError};

/// Persists fields as one pretty-printed JSON document.
///
/// Every mutation rewrites the whole document through a sibling temp file
/// followed by a rename, so a crash mid-write leaves the previous document
/// intact.
#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, i64>>,
}

impl FileProfileStore {
    /// Open a store at `path`, creating an empty one if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(error) if error.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(error.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, values: &HashMap<String, i64>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.lock().get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut values = self.lock();
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn add(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut values = self.lock();
        let entry = values.entry(key.to_string()).or_insert(0);
        *entry += delta;
        let result = *entry;
        self.flush(&values)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        {
            let store = FileProfileStore::open(&path).unwrap();
            store.set("upgrade.max_health", 20).unwrap();
            store.add("currency.coins", 12).unwrap();
        }

        let store = FileProfileStore::open(&path).unwrap();
        assert_eq!(store.get("upgrade.max_health").unwrap(), Some(20));
        assert_eq!(store.get("currency.coins").unwrap(), Some(12));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
