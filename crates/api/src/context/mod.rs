//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use dulynoted_core::{
    AuthorizationOutcome, Clock, KeyValueStore, OAuthFlowEngine, ProviderAdapter, SystemClock,
};
use dulynoted_domain::{AppConfig, Provider, Result};
use dulynoted_infra::{
    config, open_store, BrowserLauncher, GitHubService, HttpClient, LaunchCanceller,
    LoopbackAuthorizer, NotionService, Providers, ReqwestTokenTransport,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::utils::browser::TerminalBrowser;

/// Sign-in state of one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub authenticated: bool,
    pub account: Option<String>,
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub providers: Providers,
    pub github: Arc<GitHubService>,
    pub notion: Arc<NotionService>,
    sign_in_cancel: LaunchCanceller,
}

impl AppContext {
    /// Load configuration from the environment and config files and wire
    /// every adapter
    ///
    /// # Errors
    /// `Configuration` for unreadable config, `Storage` when the credential
    /// store cannot be opened.
    pub fn new() -> Result<Self> {
        Self::with_config(config::load()?)
    }

    /// # Errors
    /// See [`AppContext::new`].
    pub fn with_config(config: AppConfig) -> Result<Self> {
        Self::with_launcher(config, Arc::new(TerminalBrowser))
    }

    /// Wire the production adapters, opening authorization URLs with
    /// `launcher`
    ///
    /// # Errors
    /// See [`AppContext::new`].
    pub fn with_launcher(config: AppConfig, launcher: Arc<dyn BrowserLauncher>) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let http = HttpClient::new()?;
        let authorizer =
            LoopbackAuthorizer::new(config.callback.port, &config.callback.path, launcher);
        let sign_in_cancel = authorizer.canceller();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let engine = Arc::new(OAuthFlowEngine::new(
            Arc::new(ReqwestTokenTransport::new()?),
            Arc::new(authorizer),
            Arc::clone(&clock),
        ));

        info!(
            storage = config.storage.path.as_deref().unwrap_or("memory"),
            callback_port = config.callback.port,
            "Duly Noted context initialized"
        );
        Ok(Self::from_parts(config, store, engine, clock, &http, sign_in_cancel))
    }

    /// Assemble a context from already-built ports
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        engine: Arc<OAuthFlowEngine>,
        clock: Arc<dyn Clock>,
        http: &HttpClient,
        sign_in_cancel: LaunchCanceller,
    ) -> Self {
        let providers = Providers::build(&config, store, engine, clock, http);
        let github =
            Arc::new(GitHubService::new(Arc::clone(providers.get(Provider::GitHub)), http.clone()));
        let notion =
            Arc::new(NotionService::new(Arc::clone(providers.get(Provider::Notion)), http.clone()));
        Self { config, providers, github, notion, sign_in_cancel }
    }

    #[must_use]
    pub fn adapter(&self, provider: Provider) -> &Arc<ProviderAdapter> {
        self.providers.get(provider)
    }

    /// Handle that aborts the sign-in currently waiting on the browser
    #[must_use]
    pub fn sign_in_canceller(&self) -> LaunchCanceller {
        self.sign_in_cancel.clone()
    }

    /// Sign in to `provider`, giving up after `callback.timeout_seconds`.
    ///
    /// A timeout cancels only this attempt's browser wait and lets it clean up
    /// its pending state; a token exchange already under way still completes.
    ///
    /// # Errors
    /// Any failure of [`ProviderAdapter::authorize`].
    pub async fn sign_in(&self, provider: Provider) -> Result<AuthorizationOutcome> {
        let timeout = Duration::from_secs(self.config.callback.timeout_seconds.max(1));
        let authorize = self.adapter(provider).authorize();
        tokio::pin!(authorize);

        tokio::select! {
            outcome = &mut authorize => outcome,
            () = tokio::time::sleep(timeout) => {
                warn!(provider = %provider, timeout_secs = timeout.as_secs(), "Sign-in timed out");
                self.sign_in_cancel.cancel();
                authorize.await
            }
        }
    }

    /// Sign-in state of every provider, refreshing expired credentials
    ///
    /// # Errors
    /// `Storage` when the credential store cannot be read.
    pub async fn status(&self) -> Result<Vec<ProviderStatus>> {
        let mut statuses = Vec::with_capacity(Provider::ALL.len());
        for provider in Provider::ALL {
            let adapter = self.adapter(provider);
            let authenticated = adapter.is_authenticated().await?;
            let account = if authenticated {
                adapter.identity().await?.map(|identity| identity.account_label)
            } else {
                None
            };
            statuses.push(ProviderStatus { provider, authenticated, account });
        }
        Ok(statuses)
    }
}
