//! Authenticated provider API clients
//!
//! Every call asks the provider adapter for a valid access token first and
//! list reads go through the resource cache.

pub mod github;
pub mod notion;

use std::future::Future;

use dulynoted_core::ResourceCache;
use dulynoted_domain::{CacheKey, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub use github::GitHubService;
pub use notion::{NotionService, PageParent};

/// Serve `key` from the cache unless `force_refresh`, else fetch and store
async fn read_through<T, F, Fut>(
    cache: &ResourceCache,
    key: &CacheKey,
    force_refresh: bool,
    fetch: F,
) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if force_refresh {
        cache.invalidate(key).await?;
    } else if let Some(items) = cache.get(key).await? {
        return Ok(items);
    }

    debug!(key = %key, force_refresh, "Fetching from provider API");
    let items = fetch().await?;
    cache.put(key, &items).await?;
    Ok(items)
}
