//! Persisted access credential

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::oauth::TokenResponse;

/// One provider's access credential
///
/// A credential without a refresh token cannot be renewed silently; once it
/// expires the user has to sign in again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub account_label: Option<String>,
}

impl Credential {
    /// Build a credential from a token endpoint response received at `now`.
    #[must_use]
    pub fn from_token_response(response: &TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token.clone(),
            expires_at: response.expires_at(now),
            refresh_token: response.refresh_token.clone(),
            account_label: None,
        }
    }

    /// Replacement credential after a refresh grant.
    ///
    /// Providers that do not rotate refresh tokens omit them from the refresh
    /// response, so the previous one is carried over along with the label.
    #[must_use]
    pub fn refreshed(&self, response: &TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token.clone(),
            expires_at: response.expires_at(now),
            refresh_token: response.refresh_token.clone().or_else(|| self.refresh_token.clone()),
            account_label: self.account_label.clone(),
        }
    }

    #[must_use]
    pub fn with_account_label(mut self, label: impl Into<String>) -> Self {
        self.account_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("account_label", &self.account_label)
            .finish()
    }
}
