//! Application configuration structures
//!
//! Loading lives in the infra crate; this module only defines the shape,
//! the defaults of the shipped extension and validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTHORIZE_TIMEOUT_SECS, DEFAULT_CACHE_TTL_SECS, DEFAULT_CALLBACK_PATH,
    DEFAULT_CALLBACK_PORT, DEFAULT_PROXY_URL, GITHUB_API_URL, GITHUB_AUTH_URL, GITHUB_CLIENT_ID,
    GITHUB_SCOPES, GITHUB_TOKEN_URL, NOTION_API_URL, NOTION_AUTH_URL, NOTION_CLIENT_ID,
    NOTION_TOKEN_URL, RECENTLY_USED_CAPACITY,
};
use crate::errors::{DulyNotedError, Result};
use crate::types::{Provider, TransportStrategy};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub oauth: OAuthConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub callback: CallbackConfig,
}

impl AppConfig {
    /// Fill every provider field left empty with the shipped defaults.
    #[must_use]
    pub fn with_provider_defaults(mut self) -> Self {
        self.oauth.github.apply_defaults(Provider::GitHub);
        self.oauth.notion.apply_defaults(Provider::Notion);
        self
    }

    #[must_use]
    pub fn provider(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::GitHub => &self.oauth.github,
            Provider::Notion => &self.oauth.notion,
        }
    }

    pub fn provider_mut(&mut self, provider: Provider) -> &mut ProviderConfig {
        match provider {
            Provider::GitHub => &mut self.oauth.github,
            Provider::Notion => &mut self.oauth.notion,
        }
    }

    /// Token endpoint strategy for `provider`.
    ///
    /// # Errors
    /// See [`ProviderConfig::transport_strategy`].
    pub fn transport_strategy(&self, provider: Provider) -> Result<TransportStrategy> {
        self.provider(provider).transport_strategy(provider, self.oauth.proxy_url.as_deref())
    }
}

/// OAuth client settings for every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub proxy_url: Option<String>,
    /// Identifier used by the identity redirect
    /// (`https://{installation_id}.chromiumapp.org/`)
    pub installation_id: Option<String>,
    pub github: ProviderConfig,
    pub notion: ProviderConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            installation_id: None,
            github: ProviderConfig::defaults_for(Provider::GitHub),
            notion: ProviderConfig::defaults_for(Provider::Notion),
        }
    }
}

/// How the token endpoint is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    DirectJson,
    DirectBasicAuth,
    #[default]
    Proxied,
}

/// Which redirect URI the provider registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    /// Locally hosted callback page
    #[default]
    CallbackPage,
    /// Host identity redirect keyed by installation id
    Identity,
}

/// One provider's OAuth client settings
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scopes: Vec<String>,
    pub extra_authorize_params: BTreeMap<String, String>,
    pub transport: TransportKind,
    /// Filled with the provider's default redirect when absent
    pub redirect: Option<RedirectKind>,
}

impl ProviderConfig {
    /// Settings of the shipped extension
    #[must_use]
    pub fn defaults_for(provider: Provider) -> Self {
        let mut config = Self::default();
        config.apply_defaults(provider);
        config
    }

    fn apply_defaults(&mut self, provider: Provider) {
        let (client_id, auth_url, token_url, api_url, redirect) = match provider {
            Provider::GitHub => (
                GITHUB_CLIENT_ID,
                GITHUB_AUTH_URL,
                GITHUB_TOKEN_URL,
                GITHUB_API_URL,
                RedirectKind::CallbackPage,
            ),
            Provider::Notion => (
                NOTION_CLIENT_ID,
                NOTION_AUTH_URL,
                NOTION_TOKEN_URL,
                NOTION_API_URL,
                RedirectKind::Identity,
            ),
        };

        let is_blank = |value: &str| value.trim().is_empty();
        if is_blank(&self.client_id) {
            self.client_id = client_id.to_string();
        }
        if is_blank(&self.auth_url) {
            self.auth_url = auth_url.to_string();
        }
        if is_blank(&self.token_url) {
            self.token_url = token_url.to_string();
        }
        if is_blank(&self.api_url) {
            self.api_url = api_url.to_string();
        }
        self.redirect.get_or_insert(redirect);
        match provider {
            Provider::GitHub if self.scopes.is_empty() => {
                self.scopes = GITHUB_SCOPES.iter().map(ToString::to_string).collect();
            }
            Provider::Notion if self.extra_authorize_params.is_empty() => {
                self.extra_authorize_params.insert("owner".to_string(), "user".to_string());
            }
            _ => {}
        }
    }

    /// Check that the client can start an authorization.
    ///
    /// # Errors
    /// Returns `Configuration` when the client id is missing or still a
    /// placeholder, when an endpoint is missing, or when a direct transport
    /// has no client secret.
    pub fn validate(&self, provider: Provider) -> Result<()> {
        let name = provider.display_name();
        let client_id = self.client_id.trim();
        if client_id.is_empty() || client_id.starts_with("YOUR_") {
            return Err(DulyNotedError::Configuration(format!(
                "{name} OAuth is not configured: missing client id"
            )));
        }
        if self.auth_url.trim().is_empty() || self.token_url.trim().is_empty() {
            return Err(DulyNotedError::Configuration(format!(
                "{name} OAuth is not configured: missing endpoints"
            )));
        }
        if self.transport != TransportKind::Proxied {
            self.require_secret(provider)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn redirect_kind(&self) -> RedirectKind {
        self.redirect.unwrap_or_default()
    }

    /// Token endpoint strategy, given the shared proxy base URL.
    ///
    /// # Errors
    /// Returns `Configuration` when the provider is proxied but no proxy URL
    /// is set, or is direct without a client secret.
    pub fn transport_strategy(
        &self,
        provider: Provider,
        proxy_url: Option<&str>,
    ) -> Result<TransportStrategy> {
        match self.transport {
            TransportKind::Proxied => {
                let proxy_base =
                    proxy_url.filter(|url| !url.trim().is_empty()).ok_or_else(|| {
                        DulyNotedError::Configuration(format!(
                            "{} is proxied but oauth.proxy_url is not set",
                            provider.display_name()
                        ))
                    })?;
                Ok(TransportStrategy::ProxiedJson {
                    proxy_base: proxy_base.trim().trim_end_matches('/').to_string(),
                })
            }
            TransportKind::DirectJson | TransportKind::DirectBasicAuth => {
                let client_secret = self.require_secret(provider)?;
                let token_url = self.token_url.clone();
                let client_id = self.client_id.clone();
                Ok(if self.transport == TransportKind::DirectJson {
                    TransportStrategy::DirectJsonBody { token_url, client_id, client_secret }
                } else {
                    TransportStrategy::DirectBasicAuth { token_url, client_id, client_secret }
                })
            }
        }
    }

    /// Extra authorize parameters in a stable order
    #[must_use]
    pub fn extra_params(&self) -> Vec<(String, String)> {
        self.extra_authorize_params.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn require_secret(&self, provider: Provider) -> Result<String> {
        self.client_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("YOUR_"))
            .map(str::to_string)
            .ok_or_else(|| {
                DulyNotedError::Configuration(format!(
                    "{} uses a direct token exchange but has no client secret",
                    provider.display_name()
                ))
            })
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("scopes", &self.scopes)
            .field("extra_authorize_params", &self.extra_authorize_params)
            .field("transport", &self.transport)
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Resource cache tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub recently_used_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: DEFAULT_CACHE_TTL_SECS, recently_used_capacity: RECENTLY_USED_CAPACITY }
    }
}

/// Durable key-value storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; in-memory storage when absent
    pub path: Option<String>,
}

/// Loopback callback page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    pub port: u16,
    pub path: String,
    /// Applied by callers around a whole sign-in
    pub timeout_seconds: u64,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_CALLBACK_PORT,
            path: DEFAULT_CALLBACK_PATH.to_string(),
            timeout_seconds: DEFAULT_AUTHORIZE_TIMEOUT_SECS,
        }
    }
}
