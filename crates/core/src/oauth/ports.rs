//! Port interfaces for the authorization-code flow
//!
//! These traits define the boundaries between the flow engine and the host:
//! the HTTP client that reaches token endpoints, the interactive surface the
//! user signs in through, and provider-specific redirect and identity lookup.

use async_trait::async_trait;
use dulynoted_domain::{Identity, Result, TokenResponse};
use serde_json::Value;

/// One POST to a token endpoint
#[derive(Clone, PartialEq)]
pub struct TokenRequest {
    pub url: String,
    /// `(client_id, client_secret)` for HTTP Basic authentication
    pub basic_auth: Option<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self
            .body
            .as_object()
            .map(|object| object.keys().map(String::as_str).collect())
            .unwrap_or_default();
        f.debug_struct("TokenRequest")
            .field("url", &self.url)
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| "[REDACTED]"))
            .field("body_fields", &fields)
            .finish()
    }
}

/// Raw token endpoint answer; status interpretation is up to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends token endpoint requests
///
/// Implementations must not retry: authorization codes are single-use.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    /// POST `request` and return whatever the server answered.
    ///
    /// # Errors
    /// `Network` when no response was received at all.
    async fn post(&self, request: TokenRequest) -> Result<TransportResponse>;
}

/// The host's interactive browser authorization capability
#[async_trait]
pub trait InteractiveAuthorizer: Send + Sync {
    /// Show `authorization_url` to the user and wait for the provider to
    /// redirect back.
    ///
    /// # Errors
    /// `AuthorizationCancelled` when the user closes the surface,
    /// `NoRedirect` when it completes without a redirect URL.
    async fn launch(&self, authorization_url: &str) -> Result<String>;
}

/// Supplies the redirect URI a provider's OAuth app is registered with
pub trait RedirectUriResolver: Send + Sync {
    /// # Errors
    /// `Configuration` when the URI cannot be formed.
    fn redirect_uri(&self) -> Result<String>;
}

/// Looks up the minimal identity of a freshly signed-in account
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &TokenResponse) -> Result<Identity>;
}
