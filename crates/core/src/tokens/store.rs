//! Token store over the shared key-value namespace
//!
//! Credentials are persisted field by field under the provider's keys
//! (`githubToken`, `githubTokenExpiry`, ...) with the expiry in epoch
//! milliseconds, so storage written by older builds stays readable.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use dulynoted_domain::{keys, AuthorizationState, Credential, Identity, Provider, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::storage::KeyValueStore;

/// Per-provider credential, pending authorization state and identity
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the stored credential, `None` when signed out
    pub async fn load(&self, provider: Provider) -> Result<Option<Credential>> {
        let Some(access_token) = self.get_string(&keys::token(provider)).await? else {
            return Ok(None);
        };

        let expiry_ms = self.store.get(&keys::token_expiry(provider)).await?;
        let expires_at = expiry_from_millis(expiry_ms.as_ref().and_then(Value::as_i64));

        Ok(Some(Credential {
            access_token,
            expires_at,
            refresh_token: self.get_string(&keys::refresh_token(provider)).await?,
            account_label: self.get_string(&keys::username(provider)).await?,
        }))
    }

    /// Replace the stored credential wholesale
    pub async fn save(&self, provider: Provider, credential: &Credential) -> Result<()> {
        let expiry = credential.expires_at.map_or(Value::Null, |at| json!(at.timestamp_millis()));
        let mut entries = vec![
            (keys::token(provider), json!(credential.access_token)),
            (keys::token_expiry(provider), expiry),
        ];
        let mut absent = Vec::new();

        match &credential.refresh_token {
            Some(token) => entries.push((keys::refresh_token(provider), json!(token))),
            None => absent.push(keys::refresh_token(provider)),
        }
        match &credential.account_label {
            Some(label) => entries.push((keys::username(provider), json!(label))),
            None => absent.push(keys::username(provider)),
        }

        self.store.set(entries).await?;
        if !absent.is_empty() {
            self.store.remove(&absent).await?;
        }
        debug!(
            provider = %provider,
            expires_at = ?credential.expires_at,
            refreshable = credential.can_refresh(),
            "Credential stored"
        );
        Ok(())
    }

    /// Remove the credential and identity
    pub async fn clear(&self, provider: Provider) -> Result<()> {
        let mut doomed = keys::credential_keys(provider);
        doomed.push(keys::identity(provider));
        self.store.remove(&doomed).await?;
        info!(provider = %provider, "Credential cleared");
        Ok(())
    }

    /// Persist the nonce of a new attempt, replacing any pending one
    pub async fn put_pending_state(&self, provider: Provider, state: &AuthorizationState) -> Result<()> {
        self.store.set_one(&keys::oauth_state(provider), json!(state.nonce)).await
    }

    pub async fn pending_state(&self, provider: Provider) -> Result<Option<AuthorizationState>> {
        Ok(self.get_string(&keys::oauth_state(provider)).await?.map(AuthorizationState::new))
    }

    /// Remove the pending nonce only if it is still `state`.
    ///
    /// Returns whether it was removed. A newer attempt's nonce is left alone.
    pub async fn clear_pending_state_if(
        &self,
        provider: Provider,
        state: &AuthorizationState,
    ) -> Result<bool> {
        match self.pending_state(provider).await? {
            Some(current) if current.matches(&state.nonce) => {
                self.store.remove_one(&keys::oauth_state(provider)).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub async fn clear_pending_state(&self, provider: Provider) -> Result<()> {
        self.store.remove_one(&keys::oauth_state(provider)).await
    }

    pub async fn save_identity(&self, provider: Provider, identity: &Identity) -> Result<()> {
        self.store.set_one(&keys::identity(provider), serde_json::to_value(identity)?).await
    }

    /// Stored identity; an unreadable entry counts as absent
    pub async fn identity(&self, provider: Provider) -> Result<Option<Identity>> {
        Ok(self
            .store
            .get(&keys::identity(provider))
            .await?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get(key)
            .await?
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|s| !s.is_empty()))
    }
}

fn expiry_from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
