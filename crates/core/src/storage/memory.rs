//! In-memory key-value store
//!
//! Used when no storage path is configured, and by tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dulynoted_domain::Result;
use parking_lot::RwLock;
use serde_json::Value;

use super::ports::KeyValueStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut map = self.entries.write();
        map.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
