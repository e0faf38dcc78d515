//! Provider-agnostic authorization-code flow

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dulynoted_domain::{
    AuthorizationRequest, CallbackParams, DulyNotedError, Provider, Result, TokenResponse,
    TransportStrategy,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::authorization;
use super::ports::{InteractiveAuthorizer, TokenRequest, TokenTransport, TransportResponse};
use crate::clock::Clock;

/// Grant sent to a token endpoint
enum Grant<'a> {
    AuthorizationCode { code: &'a str, redirect_uri: &'a str },
    RefreshToken { refresh_token: &'a str },
}

impl Grant<'_> {
    const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Grant-specific body fields
    fn fields(&self) -> serde_json::Map<String, Value> {
        let mut map = serde_json::Map::new();
        match self {
            Self::AuthorizationCode { code, redirect_uri } => {
                map.insert("code".into(), json!(code));
                map.insert("redirect_uri".into(), json!(redirect_uri));
            }
            Self::RefreshToken { refresh_token } => {
                map.insert("refresh_token".into(), json!(refresh_token));
            }
        }
        map
    }

    fn failure(&self, status: u16, body: String) -> DulyNotedError {
        match self {
            Self::AuthorizationCode { .. } => DulyNotedError::TokenExchangeFailed { status, body },
            Self::RefreshToken { .. } => DulyNotedError::TokenRefreshFailed { status, body },
        }
    }
}

/// Drives OAuth2 authorization-code exchanges for any provider
///
/// The engine knows nothing about a provider beyond the
/// [`TransportStrategy`] it is handed; every strategy goes through the same
/// exchange and refresh contract.
pub struct OAuthFlowEngine {
    transport: Arc<dyn TokenTransport>,
    authorizer: Arc<dyn InteractiveAuthorizer>,
    clock: Arc<dyn Clock>,
}

impl OAuthFlowEngine {
    pub fn new(
        transport: Arc<dyn TokenTransport>,
        authorizer: Arc<dyn InteractiveAuthorizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { transport, authorizer, clock }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn generate_state(&self) -> String {
        authorization::generate_state()
    }

    /// # Errors
    /// See [`authorization::build_authorization_url`].
    pub fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<String> {
        authorization::build_authorization_url(request)
    }

    /// Hand the authorization URL to the interactive surface and wait for
    /// the redirect.
    ///
    /// # Errors
    /// `AuthorizationCancelled` or `NoRedirect` from the surface.
    pub async fn launch_interactive_authorization(&self, url: &str) -> Result<String> {
        let redirect = self.authorizer.launch(url).await?;
        if redirect.trim().is_empty() {
            return Err(DulyNotedError::NoRedirect);
        }
        Ok(redirect)
    }

    /// # Errors
    /// See [`authorization::parse_callback`].
    pub fn parse_callback(&self, redirect_url: &str) -> Result<CallbackParams> {
        authorization::parse_callback(redirect_url)
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    /// `TokenExchangeFailed` on a non-2xx answer, on a 2xx answer carrying an
    /// `error` field, or on a body without an access token. `Network` when
    /// the endpoint could not be reached.
    pub async fn exchange_code_for_token(
        &self,
        strategy: &TransportStrategy,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        let grant = Grant::AuthorizationCode { code, redirect_uri };
        let response = self.send(strategy, provider, &grant).await?;
        info!(provider = %provider, transport = strategy.label(), "Authorization code exchanged");
        Ok(response)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// `TokenRefreshFailed` under the same conditions as
    /// [`Self::exchange_code_for_token`].
    pub async fn refresh_token(
        &self,
        strategy: &TransportStrategy,
        provider: Provider,
        refresh_token: &str,
    ) -> Result<TokenResponse> {
        let grant = Grant::RefreshToken { refresh_token };
        let response = self.send(strategy, provider, &grant).await?;
        info!(provider = %provider, transport = strategy.label(), "Access token refreshed");
        Ok(response)
    }

    /// Expiry check against the injected clock
    #[must_use]
    pub fn is_expired(&self, expiry: Option<DateTime<Utc>>, buffer_secs: i64) -> bool {
        authorization::is_expired(expiry, self.clock.now(), buffer_secs)
    }

    async fn send(
        &self,
        strategy: &TransportStrategy,
        provider: Provider,
        grant: &Grant<'_>,
    ) -> Result<TokenResponse> {
        let request = token_request(strategy, provider, grant);
        debug!(
            provider = %provider,
            grant_type = grant.grant_type(),
            url = %request.url,
            "Calling token endpoint"
        );
        let response = self.transport.post(request).await?;
        decode_token_response(response, grant).inspect_err(|err| {
            warn!(provider = %provider, grant_type = grant.grant_type(), error = %err, "Token endpoint rejected request");
        })
    }
}

/// Shape the HTTP request for one strategy
fn token_request(strategy: &TransportStrategy, provider: Provider, grant: &Grant<'_>) -> TokenRequest {
    match strategy {
        TransportStrategy::DirectJsonBody { token_url, client_id, client_secret } => {
            let mut body = serde_json::Map::new();
            body.insert("client_id".into(), json!(client_id));
            body.insert("client_secret".into(), json!(client_secret));
            body.extend(grant.fields());
            body.insert("grant_type".into(), json!(grant.grant_type()));
            TokenRequest { url: token_url.clone(), basic_auth: None, body: Value::Object(body) }
        }
        TransportStrategy::DirectBasicAuth { token_url, client_id, client_secret } => {
            let mut body = serde_json::Map::new();
            body.insert("grant_type".into(), json!(grant.grant_type()));
            body.extend(grant.fields());
            TokenRequest {
                url: token_url.clone(),
                basic_auth: Some((client_id.clone(), client_secret.clone())),
                body: Value::Object(body),
            }
        }
        TransportStrategy::ProxiedJson { proxy_base } => {
            let action = match grant {
                Grant::AuthorizationCode { .. } => "token",
                Grant::RefreshToken { .. } => "refresh",
            };
            TokenRequest {
                url: format!("{proxy_base}/api/{provider}/{action}"),
                basic_auth: None,
                body: Value::Object(grant.fields()),
            }
        }
    }
}

fn decode_token_response(response: TransportResponse, grant: &Grant<'_>) -> Result<TokenResponse> {
    let TransportResponse { status, body } = response;
    if !(200..300).contains(&status) {
        return Err(grant.failure(status, body));
    }

    // GitHub reports bad codes with a 200 and an `error` field
    let Ok(value) = serde_json::from_str::<Value>(&body) else {
        return Err(grant.failure(status, body));
    };
    if value.get("error").is_some_and(|e| !e.is_null()) {
        return Err(grant.failure(status, body));
    }

    serde_json::from_value::<TokenResponse>(value).map_err(|_| grant.failure(status, body))
}
