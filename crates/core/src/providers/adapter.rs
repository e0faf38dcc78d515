//! Provider adapter
//!
//! Binds the flow engine, the token store and the resource cache to one
//! provider's configuration and exposes the operations the rest of the
//! application uses: sign in, check the session, get a usable token and
//! sign out.

use std::sync::Arc;

use dulynoted_domain::constants::DEFAULT_EXPIRY_BUFFER_SECS;
use dulynoted_domain::{
    AppConfig, AuthorizationRequest, AuthorizationState, Credential, DulyNotedError, Identity,
    Provider, ProviderConfig, Result, TransportStrategy, WorkspaceInfo,
};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::ResourceCache;
use crate::oauth::ports::{IdentityResolver, RedirectUriResolver};
use crate::oauth::OAuthFlowEngine;
use crate::tokens::TokenStore;

/// Static per-provider settings
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub client: ProviderConfig,
    pub proxy_url: Option<String>,
    pub expiry_buffer_secs: i64,
}

impl ProviderSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig, provider: Provider) -> Self {
        Self {
            provider,
            client: config.provider(provider).clone(),
            proxy_url: config.oauth.proxy_url.clone(),
            expiry_buffer_secs: DEFAULT_EXPIRY_BUFFER_SECS,
        }
    }

    fn transport(&self) -> Result<TransportStrategy> {
        self.client.transport_strategy(self.provider, self.proxy_url.as_deref())
    }
}

/// Result of a successful sign-in
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationOutcome {
    pub access_token: String,
    pub identity: Identity,
}

impl std::fmt::Debug for AuthorizationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationOutcome")
            .field("access_token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// One provider's sign-in and token lifecycle
pub struct ProviderAdapter {
    settings: ProviderSettings,
    engine: Arc<OAuthFlowEngine>,
    tokens: TokenStore,
    cache: ResourceCache,
    redirect: Arc<dyn RedirectUriResolver>,
    identity: Arc<dyn IdentityResolver>,
}

impl ProviderAdapter {
    pub fn new(
        settings: ProviderSettings,
        engine: Arc<OAuthFlowEngine>,
        tokens: TokenStore,
        cache: ResourceCache,
        redirect: Arc<dyn RedirectUriResolver>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self { settings, engine, tokens, cache, redirect, identity }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.settings.provider
    }

    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    #[must_use]
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Run the complete sign-in flow.
    ///
    /// The pending state nonce is removed afterwards whatever the outcome,
    /// unless a newer attempt has replaced it in the meantime.
    ///
    /// # Errors
    /// `Configuration` before anything is launched when the client is not
    /// configured; otherwise any failure of the flow (`AuthorizationCancelled`,
    /// `OAuth`, `StateMismatch`, `TokenExchangeFailed`, ...).
    pub async fn authorize(&self) -> Result<AuthorizationOutcome> {
        let provider = self.provider();
        let attempt_id = Uuid::new_v4();
        let span = info_span!("oauth.authorize", provider = %provider, attempt_id = %attempt_id);

        async move {
            self.settings.client.validate(provider)?;
            let transport = self.settings.transport()?;
            let redirect_uri = self.redirect.redirect_uri()?;

            let state = AuthorizationState::new(self.engine.generate_state());
            self.tokens.put_pending_state(provider, &state).await?;

            let outcome = self.run_flow(&state, &transport, &redirect_uri).await;

            match self.tokens.clear_pending_state_if(provider, &state).await {
                Ok(false) => debug!("Pending state superseded by a newer attempt"),
                Ok(true) => {}
                Err(err) => warn!(error = %err, "Failed to clear pending authorization state"),
            }

            match &outcome {
                Ok(result) => info!(account = %result.identity.account_label, "Signed in"),
                Err(err) if err.is_cancellation() => info!("Sign-in cancelled by user"),
                Err(err) => warn!(error = %err, "Sign-in failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_flow(
        &self,
        state: &AuthorizationState,
        transport: &TransportStrategy,
        redirect_uri: &str,
    ) -> Result<AuthorizationOutcome> {
        let provider = self.provider();
        let client = &self.settings.client;

        let url = self.engine.build_authorization_url(&AuthorizationRequest {
            auth_url: client.auth_url.clone(),
            client_id: client.client_id.clone(),
            redirect_uri: redirect_uri.to_string(),
            scopes: client.scopes.clone(),
            state: state.nonce.clone(),
            extra_params: client.extra_params(),
        })?;

        let redirect_url = self.engine.launch_interactive_authorization(&url).await?;
        let callback = self.engine.parse_callback(&redirect_url)?;

        // Compare against storage, not `state`: a newer attempt replaces the
        // stored nonce and must invalidate this one.
        let pending = self.tokens.pending_state(provider).await?;
        if !pending.is_some_and(|stored| stored.matches(&callback.state) && stored == *state) {
            warn!("Authorization state mismatch, aborting before token exchange");
            return Err(DulyNotedError::StateMismatch);
        }

        let token = self
            .engine
            .exchange_code_for_token(transport, provider, &callback.code, redirect_uri)
            .await?;
        let identity = self.identity.resolve(&token).await?;

        let credential = Credential::from_token_response(&token, self.engine.now())
            .with_account_label(identity.account_label.clone());
        self.tokens.save(provider, &credential).await?;
        self.tokens.save_identity(provider, &identity).await?;

        Ok(AuthorizationOutcome { access_token: credential.access_token, identity })
    }

    /// Whether a usable credential exists, refreshing it if needed
    pub async fn is_authenticated(&self) -> Result<bool> {
        self.refresh_if_needed().await
    }

    /// Make sure the stored credential is not expired.
    ///
    /// Returns `true` when a valid credential is stored afterwards. An
    /// expired credential without a refresh token, or a failed refresh,
    /// yields `false`; the user has to sign in again.
    pub async fn refresh_if_needed(&self) -> Result<bool> {
        let provider = self.provider();
        let Some(credential) = self.tokens.load(provider).await? else {
            return Ok(false);
        };

        if !self.engine.is_expired(credential.expires_at, self.settings.expiry_buffer_secs) {
            return Ok(true);
        }

        let Some(refresh_token) = credential.refresh_token.as_deref().filter(|t| !t.is_empty())
        else {
            warn!(provider = %provider, "Token expired and no refresh token available");
            return Ok(false);
        };

        let transport = match self.settings.transport() {
            Ok(transport) => transport,
            Err(err) => {
                warn!(provider = %provider, error = %err, "Cannot refresh token");
                return Ok(false);
            }
        };

        match self.engine.refresh_token(&transport, provider, refresh_token).await {
            Ok(response) => {
                let renewed = credential.refreshed(&response, self.engine.now());
                self.tokens.save(provider, &renewed).await?;
                info!(provider = %provider, expires_at = ?renewed.expires_at, "Token refreshed");
                Ok(true)
            }
            Err(err) => {
                warn!(provider = %provider, error = %err, "Token refresh failed");
                Ok(false)
            }
        }
    }

    /// A valid access token, refreshed first if needed; `None` when signed
    /// out
    pub async fn get_access_token(&self) -> Result<Option<String>> {
        if !self.refresh_if_needed().await? {
            return Ok(None);
        }
        Ok(self.tokens.load(self.provider()).await?.map(|c| c.access_token))
    }

    /// Like [`Self::get_access_token`] but fails fast when signed out.
    ///
    /// # Errors
    /// `NotAuthenticated` when no valid token is available.
    pub async fn require_access_token(&self) -> Result<String> {
        self.get_access_token()
            .await?
            .ok_or(DulyNotedError::NotAuthenticated(self.provider()))
    }

    /// Identity stored at sign-in
    pub async fn identity(&self) -> Result<Option<Identity>> {
        self.tokens.identity(self.provider()).await
    }

    /// Workspace details for providers that return them; `None` when signed
    /// out
    pub async fn workspace_info(&self) -> Result<Option<WorkspaceInfo>> {
        if self.tokens.load(self.provider()).await?.is_none() {
            return Ok(None);
        }
        Ok(self.identity().await?.and_then(|identity| identity.workspace))
    }

    /// Remove the credential, pending state, identity and every cached
    /// collection and recently-used list of this provider
    pub async fn sign_out(&self) -> Result<()> {
        let provider = self.provider();
        self.tokens.clear(provider).await?;
        self.tokens.clear_pending_state(provider).await?;
        self.cache.invalidate_all(provider).await?;
        self.cache.clear_recently_used(provider).await?;
        info!(provider = %provider, "Signed out");
        Ok(())
    }
}
