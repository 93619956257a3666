//! In-memory key-value storage.
//!
//! Thread-safe `KeyValueStore` backed by a `RwLock<HashMap>`. Values are
//! lost when the store is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{BootcampError, Result};
use crate::storage::KeyValueStore;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of keys in the store.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(key: &str) -> BootcampError {
    BootcampError::persistence(key, "in-memory store lock poisoned")
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| poisoned(key))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| poisoned(key))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| poisoned(key))?;
        values.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut values = self.values.write().map_err(|_| poisoned("*"))?;
        values.clear();
        Ok(())
    }
}
