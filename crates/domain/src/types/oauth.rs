//! Authorization-code flow data

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Pending CSRF nonce of one in-flight authorization attempt
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    pub nonce: String,
}

impl AuthorizationState {
    #[must_use]
    pub fn new(nonce: impl Into<String>) -> Self {
        Self { nonce: nonce.into() }
    }

    /// Compare the nonce returned on the callback with this one.
    ///
    /// Runs in time independent of where the first differing byte is.
    #[must_use]
    pub fn matches(&self, returned: &str) -> bool {
        let expected = self.nonce.as_bytes();
        let returned = returned.as_bytes();
        if expected.len() != returned.len() {
            return false;
        }
        expected.iter().zip(returned).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl std::fmt::Debug for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationState").field("nonce", &"[REDACTED]").finish()
    }
}

/// Inputs of an authorization URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub auth_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub state: String,
    /// Provider-specific parameters appended after the standard ones
    pub extra_params: Vec<(String, String)>,
}

/// `code` and `state` extracted from a successful redirect
#[derive(Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

impl std::fmt::Debug for CallbackParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackParams")
            .field("code", &"[REDACTED]")
            .field("state", &"[REDACTED]")
            .finish()
    }
}

/// Token endpoint response as providers send it
///
/// Fields beyond the standard ones (Notion's `workspace_name`, `bot_id`, ...)
/// are kept in `extra`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenResponse {
    /// Absolute expiry for a response received at `now`
    ///
    /// Negative lifetimes and lifetimes past the representable date range are
    /// treated as no expiry.
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = self.expires_in.filter(|secs| *secs >= 0)?;
        Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
    }

    /// String field from the provider-specific extras
    #[must_use]
    pub fn extra_str(&self, field: &str) -> Option<&str> {
        self.extra.get(field).and_then(serde_json::Value::as_str)
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("extra_fields", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// How the token endpoint is reached for one provider
///
/// Selected once from configuration; the flow engine consumes every variant
/// through the same exchange and refresh contract.
#[derive(Clone, PartialEq, Eq)]
pub enum TransportStrategy {
    /// Client credentials in the JSON body
    DirectJsonBody { token_url: String, client_id: String, client_secret: String },
    /// Client credentials as HTTP Basic authentication, grant in the JSON body
    DirectBasicAuth { token_url: String, client_id: String, client_secret: String },
    /// A proxy that injects the client secret server-side
    ProxiedJson { proxy_base: String },
}

impl TransportStrategy {
    /// Short name for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DirectJsonBody { .. } => "direct_json",
            Self::DirectBasicAuth { .. } => "direct_basic_auth",
            Self::ProxiedJson { .. } => "proxied",
        }
    }
}

impl std::fmt::Debug for TransportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectJsonBody { token_url, client_id, .. }
            | Self::DirectBasicAuth { token_url, client_id, .. } => f
                .debug_struct(self.label())
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
            Self::ProxiedJson { proxy_base } => {
                f.debug_struct(self.label()).field("proxy_base", proxy_base).finish()
            }
        }
    }
}
