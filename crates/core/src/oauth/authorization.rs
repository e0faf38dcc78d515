//! Pure pieces of the authorization request and callback

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dulynoted_domain::constants::STATE_NONCE_BYTES;
use dulynoted_domain::{AuthorizationRequest, CallbackParams, DulyNotedError, Result};
use rand::RngCore;
use url::Url;

/// Generate an unguessable CSRF state token
///
/// 32 bytes from the thread-local CSPRNG, URL-safe base64 without padding
/// (43 characters).
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the provider authorization URL
///
/// Adds `client_id`, `redirect_uri`, `scope` (space separated), `state` and
/// `response_type=code`, then any provider-specific parameters. Existing
/// query parameters on `auth_url` are preserved.
///
/// # Errors
/// Returns `Configuration` if `auth_url` is not an absolute URL.
pub fn build_authorization_url(request: &AuthorizationRequest) -> Result<String> {
    let mut url = Url::parse(&request.auth_url).map_err(|e| {
        DulyNotedError::Configuration(format!("Invalid authorization URL: {e}"))
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &request.client_id)
            .append_pair("redirect_uri", &request.redirect_uri)
            .append_pair("scope", &request.scopes.join(" "))
            .append_pair("state", &request.state)
            .append_pair("response_type", "code");
        for (name, value) in &request.extra_params {
            query.append_pair(name, value);
        }
    }

    Ok(url.into())
}

/// Extract `code` and `state` from a redirect URL
///
/// Works for the hosted callback page and for identity redirects alike.
///
/// # Errors
/// - `OAuth` when the provider reported an `error`
/// - `MalformedCallback` when the URL cannot be parsed or lacks `code` or
///   `state`
pub fn parse_callback(redirect_url: &str) -> Result<CallbackParams> {
    let url = Url::parse(redirect_url)
        .map_err(|e| DulyNotedError::MalformedCallback(format!("invalid redirect URL: {e}")))?;

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        return Err(DulyNotedError::OAuth {
            error: error.clone(),
            description: params.get("error_description").filter(|d| !d.is_empty()).cloned(),
        });
    }

    let non_empty = |name: &str| params.get(name).filter(|v| !v.is_empty()).cloned();
    match (non_empty("code"), non_empty("state")) {
        (Some(code), Some(state)) => Ok(CallbackParams { code, state }),
        (None, _) => Err(DulyNotedError::MalformedCallback("missing authorization code".into())),
        (_, None) => Err(DulyNotedError::MalformedCallback("missing state".into())),
    }
}

/// Whether a token with `expiry` must be treated as expired at `now`
///
/// No expiry means the token never expires. Otherwise it is expired once
/// `now` is within `buffer_secs` of the expiry. A buffer too large to
/// subtract from the expiry counts as expired.
#[must_use]
pub fn is_expired(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>, buffer_secs: i64) -> bool {
    expiry.is_some_and(|expiry| {
        Duration::try_seconds(buffer_secs)
            .and_then(|buffer| expiry.checked_sub_signed(buffer))
            .map_or(true, |deadline| now >= deadline)
    })
}
