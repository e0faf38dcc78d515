//! Mock implementations of the core ports

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dulynoted_domain::{DulyNotedError, Identity, Result, TokenResponse};
use parking_lot::Mutex;
use url::Url;

use crate::clock::Clock;
use crate::oauth::ports::{
    IdentityResolver, InteractiveAuthorizer, TokenRequest, TokenTransport, TransportResponse,
};

/// Clock that only moves when told to
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Starts at 2023-11-14T22:13:20Z
    #[must_use]
    pub fn new() -> Self {
        Self::at(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_else(Utc::now))
    }

    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Token transport that replays queued responses and records requests
///
/// An empty queue answers with a network error.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<TransportResponse>>>>,
    requests: Arc<Mutex<Vec<TokenRequest>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and a JSON body
    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.responses.lock().push_back(Ok(TransportResponse::new(status, body.to_string())));
        self
    }

    /// Queue a raw response body
    pub fn push_raw(&self, status: u16, body: &str) -> &Self {
        self.responses.lock().push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: DulyNotedError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<TokenRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TokenTransport for MockTransport {
    async fn post(&self, request: TokenRequest) -> Result<TransportResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DulyNotedError::Network("no mock response queued".into())))
    }
}

#[derive(Debug, Clone)]
enum AuthorizerBehavior {
    /// Redirect to `base` with `code` and the state found in the URL
    Approve { base: String, code: String },
    /// Redirect to `base` with `code` and a fixed state
    ForgedState { base: String, code: String, state: String },
    /// Redirect to a fixed URL
    Redirect(String),
    Fail(DulyNotedError),
}

/// Interactive authorizer that answers without a browser
#[derive(Debug, Clone)]
pub struct MockAuthorizer {
    behavior: AuthorizerBehavior,
    launched: Arc<Mutex<Vec<String>>>,
}

impl MockAuthorizer {
    /// The user approves; the redirect echoes the request's state
    #[must_use]
    pub fn approving(redirect_base: &str, code: &str) -> Self {
        Self::with(AuthorizerBehavior::Approve {
            base: redirect_base.to_string(),
            code: code.to_string(),
        })
    }

    /// The redirect carries `state` instead of the request's state
    #[must_use]
    pub fn with_state(redirect_base: &str, code: &str, state: &str) -> Self {
        Self::with(AuthorizerBehavior::ForgedState {
            base: redirect_base.to_string(),
            code: code.to_string(),
            state: state.to_string(),
        })
    }

    /// Always returns `redirect_url` verbatim
    #[must_use]
    pub fn redirecting_to(redirect_url: &str) -> Self {
        Self::with(AuthorizerBehavior::Redirect(redirect_url.to_string()))
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::with(AuthorizerBehavior::Fail(DulyNotedError::AuthorizationCancelled))
    }

    #[must_use]
    pub fn failing(error: DulyNotedError) -> Self {
        Self::with(AuthorizerBehavior::Fail(error))
    }

    fn with(behavior: AuthorizerBehavior) -> Self {
        Self { behavior, launched: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Authorization URLs this authorizer was asked to open
    #[must_use]
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().clone()
    }
}

fn redirect_with(base: &str, code: &str, state: &str) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| DulyNotedError::Internal(e.to_string()))?;
    url.query_pairs_mut().append_pair("code", code).append_pair("state", state);
    Ok(url.into())
}

#[async_trait]
impl InteractiveAuthorizer for MockAuthorizer {
    async fn launch(&self, authorization_url: &str) -> Result<String> {
        self.launched.lock().push(authorization_url.to_string());
        match &self.behavior {
            AuthorizerBehavior::Approve { base, code } => {
                let url = Url::parse(authorization_url)
                    .map_err(|e| DulyNotedError::Internal(e.to_string()))?;
                let state = url
                    .query_pairs()
                    .find(|(name, _)| name == "state")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default();
                redirect_with(base, code, &state)
            }
            AuthorizerBehavior::ForgedState { base, code, state } => {
                redirect_with(base, code, state)
            }
            AuthorizerBehavior::Redirect(url) => Ok(url.clone()),
            AuthorizerBehavior::Fail(error) => Err(error.clone()),
        }
    }
}

/// Identity resolver with a fixed answer
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    identity: Identity,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(account_label: &str) -> Self {
        Self { identity: Identity::new(account_label) }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self, _token: &TokenResponse) -> Result<Identity> {
        Ok(self.identity.clone())
    }
}
