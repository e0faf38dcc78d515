//! Port interface for the host's persistent key-value storage
//!
//! Credentials, pending authorization state and cached collections all live
//! in one flat namespace of JSON values. Values returned by the store are
//! copies; mutating them has no effect until they are written back.

use async_trait::async_trait;
use dulynoted_domain::Result;
use serde_json::Value;

/// Narrow get/set/remove contract over a persistent JSON key-value namespace
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read one value, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write several values
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()>;

    /// Remove keys; absent keys are ignored
    async fn remove(&self, keys: &[String]) -> Result<()>;

    /// Every key currently stored
    async fn keys(&self) -> Result<Vec<String>>;

    /// Write a single value
    async fn set_one(&self, key: &str, value: Value) -> Result<()> {
        self.set(vec![(key.to_string(), value)]).await
    }

    /// Remove a single key
    async fn remove_one(&self, key: &str) -> Result<()> {
        self.remove(&[key.to_string()]).await
    }
}
