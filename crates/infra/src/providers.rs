//! Provider wiring
//!
//! Builds one [`ProviderAdapter`] per provider from the loaded
//! configuration, sharing a single flow engine, store and cache.

use std::sync::Arc;

use dulynoted_core::{
    CallbackPageRedirect, Clock, IdentityRedirect, IdentityResolver, KeyValueStore, MemoryStore,
    OAuthFlowEngine, ProviderAdapter, ProviderSettings, RedirectUriResolver, ResourceCache,
    TokenResponseIdentity, TokenStore,
};
use dulynoted_domain::{AppConfig, Provider, RedirectKind, Result, StorageConfig};
use tracing::info;

use crate::http::HttpClient;
use crate::oauth::GitHubIdentityResolver;
use crate::storage::SqliteKeyValueStore;

/// SQLite store at `storage.path`, in-memory when unset
///
/// # Errors
/// `Storage` when the SQLite file cannot be opened.
pub fn open_store(storage: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match storage.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => Ok(Arc::new(SqliteKeyValueStore::open(path)?)),
        None => {
            info!("No storage path configured, credentials will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Redirect resolver selected by the provider's `redirect` setting
pub fn redirect_resolver(config: &AppConfig, provider: Provider) -> Arc<dyn RedirectUriResolver> {
    match config.provider(provider).redirect_kind() {
        RedirectKind::CallbackPage => {
            Arc::new(CallbackPageRedirect::loopback(config.callback.port, &config.callback.path))
        }
        RedirectKind::Identity => {
            Arc::new(IdentityRedirect::new(config.oauth.installation_id.clone()))
        }
    }
}

fn identity_resolver(
    config: &AppConfig,
    provider: Provider,
    http: &HttpClient,
) -> Arc<dyn IdentityResolver> {
    match provider {
        Provider::GitHub => Arc::new(GitHubIdentityResolver::new(
            http.clone(),
            config.provider(provider).api_url.clone(),
        )),
        Provider::Notion => Arc::new(TokenResponseIdentity),
    }
}

/// Every configured provider adapter
#[derive(Clone)]
pub struct Providers {
    github: Arc<ProviderAdapter>,
    notion: Arc<ProviderAdapter>,
    cache: ResourceCache,
}

impl Providers {
    pub fn build(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        engine: Arc<OAuthFlowEngine>,
        clock: Arc<dyn Clock>,
        http: &HttpClient,
    ) -> Self {
        let tokens = TokenStore::new(Arc::clone(&store));
        let cache = ResourceCache::with_limits(
            store,
            clock,
            config.cache.ttl_seconds,
            config.cache.recently_used_capacity,
        );

        let adapter = |provider: Provider| {
            Arc::new(ProviderAdapter::new(
                ProviderSettings::from_config(config, provider),
                Arc::clone(&engine),
                tokens.clone(),
                cache.clone(),
                redirect_resolver(config, provider),
                identity_resolver(config, provider, http),
            ))
        };

        Self { github: adapter(Provider::GitHub), notion: adapter(Provider::Notion), cache }
    }

    #[must_use]
    pub fn get(&self, provider: Provider) -> &Arc<ProviderAdapter> {
        match provider {
            Provider::GitHub => &self.github,
            Provider::Notion => &self.notion,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }
}
