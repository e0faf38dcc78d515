//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Provider;

/// Main error type for Duly Noted
///
/// Covers every failure of the sign-in flow and token lifecycle, plus the
/// ambient storage/network failures of the adapters around them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum DulyNotedError {
    /// Required client configuration (client id, endpoints, secret) is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The user closed the interactive authorization surface.
    #[error("Authorization cancelled by the user")]
    AuthorizationCancelled,

    /// The interactive authorization surface returned without a redirect URL.
    #[error("No redirect URL returned from the authorization surface")]
    NoRedirect,

    /// The provider reported an error on the callback.
    #[error("OAuth error: {}", .description.as_deref().unwrap_or(.error))]
    OAuth { error: String, description: Option<String> },

    /// The callback URL lacks `code` or `state`, or cannot be parsed.
    #[error("Malformed authorization callback: {0}")]
    MalformedCallback(String),

    /// The returned state does not match the pending nonce (possible CSRF).
    #[error("Authorization state mismatch")]
    StateMismatch,

    /// The token endpoint rejected the authorization code.
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchangeFailed { status: u16, body: String },

    /// The token endpoint rejected the refresh token.
    #[error("Token refresh failed ({status}): {body}")]
    TokenRefreshFailed { status: u16, body: String },

    /// An API call was attempted without a valid token.
    #[error("Not authenticated with {0}")]
    NotAuthenticated(Provider),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    /// A provider API answered with a non-success status.
    #[error("{provider} API error ({status}): {message}")]
    Api { provider: Provider, status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DulyNotedError {
    /// Text that is safe to surface to the signed-in user.
    ///
    /// CSRF-class failures collapse to a generic message; provider errors are
    /// shown verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StateMismatch | Self::MalformedCallback(_) | Self::NoRedirect => {
                "Authorization failed. Please try again.".to_string()
            }
            Self::AuthorizationCancelled => "Sign-in was cancelled.".to_string(),
            Self::OAuth { error, description } => {
                description.clone().unwrap_or_else(|| error.clone())
            }
            Self::NotAuthenticated(provider) => {
                format!("Not signed in to {}. Please sign in first.", provider.display_name())
            }
            other => other.to_string(),
        }
    }

    /// Whether this failure is user-initiated and should not be shown as an
    /// error.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::AuthorizationCancelled)
    }

    /// Whether the user has to sign in again to recover.
    #[must_use]
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated(_)
                | Self::TokenRefreshFailed { .. }
                | Self::Api { status: 401, .. }
        )
    }
}

impl From<serde_json::Error> for DulyNotedError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON error: {err}"))
    }
}

/// Result type alias for Duly Noted operations
pub type Result<T> = std::result::Result<T, DulyNotedError>;
