//! Resource cache service
//!
//! Collections are stored as a whole next to a `cachedAt` stamp and are
//! checked for freshness on every read; nothing is evicted in the
//! background. Scoped sub-caches (labels per repository, ...) are tracked in
//! a per-kind scope index. The index is not updated atomically, so wiping a
//! provider also sweeps the key space for scoped keys the index missed.

use std::sync::Arc;

use chrono::Duration;
use dulynoted_domain::constants::{DEFAULT_CACHE_TTL_SECS, RECENTLY_USED_CAPACITY};
use dulynoted_domain::{keys, CacheKey, Provider, ResourceKind, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::clock::Clock;
use crate::storage::KeyValueStore;

/// Read-time TTL cache plus bounded recently-used lists
#[derive(Clone)]
pub struct ResourceCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    recently_used_capacity: usize,
}

impl ResourceCache {
    /// Cache with the default 24 hour TTL and five recently-used entries
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(store, clock, DEFAULT_CACHE_TTL_SECS, RECENTLY_USED_CAPACITY)
    }

    pub fn with_limits(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl_seconds: u64,
        recently_used_capacity: usize,
    ) -> Self {
        let secs = i64::try_from(ttl_seconds).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
        let ttl = Duration::seconds(secs);
        Self { store, clock, ttl, recently_used_capacity: recently_used_capacity.max(1) }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh items for `key`, `None` when absent, stale or unreadable
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<Vec<T>>> {
        let Some(cached_at) =
            self.store.get(&key.cached_at_key()).await?.as_ref().and_then(Value::as_i64)
        else {
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        let age_ms = self.clock.now_millis().saturating_sub(cached_at);
        if age_ms > self.ttl.num_milliseconds() {
            debug!(key = %key, age_ms, "Cache entry expired");
            return Ok(None);
        }

        let Some(items) = self.store.get(&key.items_key()).await? else {
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_value::<Vec<T>>(items) {
            Ok(items) => {
                debug!(key = %key, items = items.len(), "Cache hit");
                Ok(Some(items))
            }
            Err(err) => {
                debug!(key = %key, error = %err, "Cached collection unreadable, treating as miss");
                Ok(None)
            }
        }
    }

    /// Replace the collection for `key` and stamp it with the current time
    pub async fn put<T: Serialize>(&self, key: &CacheKey, items: &[T]) -> Result<()> {
        let value = serde_json::to_value(items)?;
        self.store
            .set(vec![
                (key.items_key(), value),
                (key.cached_at_key(), json!(self.clock.now_millis())),
            ])
            .await?;

        if let Some(scope) = &key.scope {
            let mut scopes = self.scopes(key.provider, key.kind).await?;
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.clone());
                self.write_scopes(key.provider, key.kind, &scopes).await?;
            }
        }

        debug!(key = %key, items = items.len(), "Cache updated");
        Ok(())
    }

    /// Drop one collection, used before a forced refresh
    pub async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.store.remove(&[key.items_key(), key.cached_at_key()]).await?;

        if let Some(scope) = &key.scope {
            let mut scopes = self.scopes(key.provider, key.kind).await?;
            let before = scopes.len();
            scopes.retain(|s| s != scope);
            if scopes.len() != before {
                self.write_scopes(key.provider, key.kind, &scopes).await?;
            }
        }

        debug!(key = %key, "Cache invalidated");
        Ok(())
    }

    /// Drop every collection of `provider`, scoped sub-caches included
    pub async fn invalidate_all(&self, provider: Provider) -> Result<()> {
        let mut doomed = Vec::new();
        let mut prefixes = Vec::new();
        for kind in ResourceKind::ALL {
            doomed.push(keys::collection(provider, kind, None));
            doomed.push(keys::cached_at(provider, kind, None));
            for scope in self.scopes(provider, kind).await? {
                doomed.push(keys::collection(provider, kind, Some(&scope)));
                doomed.push(keys::cached_at(provider, kind, Some(&scope)));
            }
            doomed.push(keys::scope_index(provider, kind));
            prefixes.extend(keys::scoped_prefixes(provider, kind));
        }

        let indexed = doomed.len();
        for key in self.store.keys().await? {
            let scoped = prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()));
            if scoped && !doomed.contains(&key) {
                doomed.push(key);
            }
        }
        if doomed.len() > indexed {
            debug!(
                provider = %provider,
                unindexed = doomed.len() - indexed,
                "Sweeping sub-caches missing from the scope index"
            );
        }

        self.store.remove(&doomed).await?;
        debug!(provider = %provider, "All cached collections invalidated");
        Ok(())
    }

    /// Move `identity_key` to the front of the recently-used list
    pub async fn add_recently_used(
        &self,
        provider: Provider,
        kind: ResourceKind,
        identity_key: &str,
    ) -> Result<()> {
        let mut list = self.get_recently_used(provider, kind).await?;
        list.retain(|existing| existing != identity_key);
        list.insert(0, identity_key.to_string());
        list.truncate(self.recently_used_capacity);
        self.store.set_one(&keys::recently_used(provider, kind), json!(list)).await
    }

    /// Most-recent-first identity keys
    pub async fn get_recently_used(
        &self,
        provider: Provider,
        kind: ResourceKind,
    ) -> Result<Vec<String>> {
        self.read_string_list(&keys::recently_used(provider, kind)).await
    }

    /// Drop every recently-used list of `provider`
    pub async fn clear_recently_used(&self, provider: Provider) -> Result<()> {
        let doomed: Vec<String> =
            ResourceKind::ALL.iter().map(|kind| keys::recently_used(provider, *kind)).collect();
        self.store.remove(&doomed).await
    }

    async fn scopes(&self, provider: Provider, kind: ResourceKind) -> Result<Vec<String>> {
        self.read_string_list(&keys::scope_index(provider, kind)).await
    }

    async fn write_scopes(&self, provider: Provider, kind: ResourceKind, scopes: &[String]) -> Result<()> {
        let key = keys::scope_index(provider, kind);
        if scopes.is_empty() {
            self.store.remove_one(&key).await
        } else {
            self.store.set_one(&key, json!(scopes)).await
        }
    }

    async fn read_string_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .store
            .get(key)
            .await?
            .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
            .unwrap_or_default())
    }
}
