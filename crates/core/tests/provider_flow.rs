//! End-to-end sign-in and token lifecycle through `ProviderAdapter`, with
//! every port replaced by an in-process double.

use std::sync::Arc;

use chrono::Duration;
use dulynoted_core::testing::{MockAuthorizer, MockClock, MockTransport, StaticIdentity};
use dulynoted_core::{
    CallbackPageRedirect, Clock, IdentityRedirect, KeyValueStore, MemoryStore, OAuthFlowEngine,
    ProviderAdapter, ProviderSettings, ResourceCache, TokenResponseIdentity, TokenStore,
};
use dulynoted_domain::{
    AppConfig, CacheKey, Credential, DulyNotedError, Provider, ResourceKind, TransportKind,
};
use serde_json::json;

const CALLBACK: &str = "http://127.0.0.1:8917/oauth/callback";

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<MockClock>,
    transport: MockTransport,
    authorizer: MockAuthorizer,
    adapter: ProviderAdapter,
}

fn harness(provider: Provider, config: &AppConfig, authorizer: MockAuthorizer) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new());
    let transport = MockTransport::new();

    let engine = Arc::new(OAuthFlowEngine::new(
        Arc::new(transport.clone()),
        Arc::new(authorizer.clone()),
        clock.clone(),
    ));
    let tokens = TokenStore::new(store.clone());
    let cache = ResourceCache::new(store.clone(), clock.clone());
    let adapter = ProviderAdapter::new(
        ProviderSettings::from_config(config, provider),
        engine,
        tokens,
        cache,
        Arc::new(CallbackPageRedirect::new(CALLBACK)),
        Arc::new(StaticIdentity::new("octocat")),
    );

    Harness { store, clock, transport, authorizer, adapter }
}

fn github(authorizer: MockAuthorizer) -> Harness {
    harness(Provider::GitHub, &AppConfig::default(), authorizer)
}

async fn store_credential(h: &Harness, credential: &Credential) {
    TokenStore::new(h.store.clone()).save(Provider::GitHub, credential).await.unwrap();
}

#[tokio::test]
async fn authorize_then_get_access_token() {
    let h = github(MockAuthorizer::approving(CALLBACK, "c1"));
    h.transport.push_json(200, json!({ "access_token": "abc", "expires_in": 3600, "refresh_token": "r1" }));

    let outcome = h.adapter.authorize().await.unwrap();
    assert_eq!(outcome.access_token, "abc");
    assert_eq!(outcome.identity.account_label, "octocat");

    assert_eq!(h.adapter.get_access_token().await.unwrap().as_deref(), Some("abc"));
    assert!(h.adapter.is_authenticated().await.unwrap());

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://duly-noted-auth.agentstarter.workers.dev/api/github/token");
    assert_eq!(requests[0].body, json!({ "code": "c1", "redirect_uri": CALLBACK }));

    assert_eq!(h.store.get("githubUsername").await.unwrap(), Some(json!("octocat")));
    assert_eq!(h.store.get("githubOAuthState").await.unwrap(), None, "state cleared after use");
}

#[tokio::test]
async fn absurd_token_lifetime_is_stored_without_expiry() {
    let h = github(MockAuthorizer::approving(CALLBACK, "c1"));
    h.transport.push_json(200, json!({ "access_token": "abc", "expires_in": i64::MAX }));

    let outcome = h.adapter.authorize().await.unwrap();
    assert_eq!(outcome.access_token, "abc");
    assert_eq!(h.store.get("githubTokenExpiry").await.unwrap(), Some(json!(null)));
    assert_eq!(h.adapter.get_access_token().await.unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn authorization_url_carries_config() {
    let h = github(MockAuthorizer::approving(CALLBACK, "c1"));
    h.transport.push_json(200, json!({ "access_token": "abc" }));
    h.adapter.authorize().await.unwrap();

    let launched = h.authorizer.launched();
    let url = url::Url::parse(&launched[0]).unwrap();
    let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(url.host_str(), Some("github.com"));
    assert_eq!(query["client_id"], "7113cf472be91f945d03");
    assert_eq!(query["scope"], "repo project read:user");
    assert_eq!(query["redirect_uri"], CALLBACK);
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["state"].len(), 43);
}

#[tokio::test]
async fn expired_token_is_refreshed_transparently() {
    let h = github(MockAuthorizer::cancelled());
    let now = h.clock.now();
    store_credential(
        &h,
        &Credential {
            access_token: "old".into(),
            expires_at: Some(now - Duration::milliseconds(1000)),
            refresh_token: Some("r1".into()),
            account_label: Some("octocat".into()),
        },
    )
    .await;
    h.transport.push_json(200, json!({ "access_token": "xyz", "expires_in": 3600 }));

    assert_eq!(h.adapter.get_access_token().await.unwrap().as_deref(), Some("xyz"));

    let expected_expiry = (now + Duration::seconds(3600)).timestamp_millis();
    assert_eq!(h.store.get("githubTokenExpiry").await.unwrap(), Some(json!(expected_expiry)));
    assert_eq!(h.store.get("githubRefreshToken").await.unwrap(), Some(json!("r1")));
    assert_eq!(h.store.get("githubUsername").await.unwrap(), Some(json!("octocat")));

    let requests = h.transport.requests();
    assert_eq!(requests[0].url, "https://duly-noted-auth.agentstarter.workers.dev/api/github/refresh");
    assert_eq!(requests[0].body, json!({ "refresh_token": "r1" }));
}

#[tokio::test]
async fn expired_token_without_refresh_token_is_signed_out() {
    let h = github(MockAuthorizer::cancelled());
    let now = h.clock.now();
    store_credential(
        &h,
        &Credential {
            access_token: "old".into(),
            expires_at: Some(now - Duration::milliseconds(1000)),
            refresh_token: None,
            account_label: None,
        },
    )
    .await;

    assert!(!h.adapter.is_authenticated().await.unwrap());
    assert_eq!(h.adapter.get_access_token().await.unwrap(), None);
    assert!(matches!(
        h.adapter.require_access_token().await,
        Err(DulyNotedError::NotAuthenticated(Provider::GitHub))
    ));
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn failed_refresh_degrades_to_unauthenticated() {
    let h = github(MockAuthorizer::cancelled());
    let now = h.clock.now();
    store_credential(
        &h,
        &Credential {
            access_token: "old".into(),
            expires_at: Some(now - Duration::seconds(1)),
            refresh_token: Some("r1".into()),
            account_label: None,
        },
    )
    .await;
    h.transport.push_raw(400, r#"{"error":"invalid_grant"}"#);

    assert!(!h.adapter.refresh_if_needed().await.unwrap());
    assert_eq!(h.store.get("githubToken").await.unwrap(), Some(json!("old")));
}

#[tokio::test]
async fn token_within_expiry_buffer_is_refreshed() {
    let h = github(MockAuthorizer::cancelled());
    let now = h.clock.now();
    store_credential(
        &h,
        &Credential {
            access_token: "old".into(),
            expires_at: Some(now + Duration::seconds(60)),
            refresh_token: Some("r1".into()),
            account_label: None,
        },
    )
    .await;
    h.transport.push_json(200, json!({ "access_token": "new", "expires_in": 3600, "refresh_token": "r2" }));

    assert_eq!(h.adapter.get_access_token().await.unwrap().as_deref(), Some("new"));
    assert_eq!(h.store.get("githubRefreshToken").await.unwrap(), Some(json!("r2")));
}

#[tokio::test]
async fn sign_out_removes_every_provider_key() {
    let h = github(MockAuthorizer::approving(CALLBACK, "c1"));
    h.transport.push_json(200, json!({ "access_token": "abc", "expires_in": 3600, "refresh_token": "r1" }));
    h.adapter.authorize().await.unwrap();

    let cache = h.adapter.cache();
    cache.put(&CacheKey::new(Provider::GitHub, ResourceKind::Repos), &["octo/alpha"]).await.unwrap();
    cache
        .put(&CacheKey::scoped(Provider::GitHub, ResourceKind::Labels, "octo/alpha"), &["bug"])
        .await
        .unwrap();
    cache.add_recently_used(Provider::GitHub, ResourceKind::Repos, "octo/alpha").await.unwrap();
    h.store.set_one("githubOAuthState", json!("left-over")).await.unwrap();
    cache.put(&CacheKey::new(Provider::Notion, ResourceKind::Databases), &["db"]).await.unwrap();

    let before = h.store.keys().await.unwrap();
    assert!(before.iter().filter(|k| k.starts_with("github")).count() >= 8, "{before:?}");

    h.adapter.sign_out().await.unwrap();

    let after = h.store.keys().await.unwrap();
    assert!(after.iter().all(|k| !k.starts_with("github")), "left behind: {after:?}");
    assert!(after.contains(&"notionDatabases".to_string()));
    assert!(!h.adapter.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn state_mismatch_never_reaches_token_endpoint() {
    let h = github(MockAuthorizer::with_state(CALLBACK, "c1", "forged-state"));
    h.transport.push_json(200, json!({ "access_token": "abc" }));

    let err = h.adapter.authorize().await.unwrap_err();
    assert_eq!(err, DulyNotedError::StateMismatch);
    assert_eq!(err.user_message(), "Authorization failed. Please try again.");
    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(h.store.get("githubToken").await.unwrap(), None);
    assert_eq!(h.store.get("githubOAuthState").await.unwrap(), None);
}

#[tokio::test]
async fn superseded_attempt_is_rejected_and_keeps_newer_state() {
    // The redirect echoes the right nonce, but a newer attempt has already
    // replaced it in storage by the time the callback is processed.
    struct Superseding {
        inner: MockAuthorizer,
        store: Arc<MemoryStore>,
    }

    #[async_trait::async_trait]
    impl dulynoted_core::InteractiveAuthorizer for Superseding {
        async fn launch(&self, url: &str) -> dulynoted_domain::Result<String> {
            self.store.set_one("githubOAuthState", json!("newer-attempt")).await?;
            self.inner.launch(url).await
        }
    }

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new());
    let transport = MockTransport::new();
    let authorizer =
        Superseding { inner: MockAuthorizer::approving(CALLBACK, "c1"), store: store.clone() };
    let engine =
        Arc::new(OAuthFlowEngine::new(Arc::new(transport.clone()), Arc::new(authorizer), clock.clone()));
    let adapter = ProviderAdapter::new(
        ProviderSettings::from_config(&AppConfig::default(), Provider::GitHub),
        engine,
        TokenStore::new(store.clone()),
        ResourceCache::new(store.clone(), clock),
        Arc::new(CallbackPageRedirect::new(CALLBACK)),
        Arc::new(StaticIdentity::new("octocat")),
    );

    assert_eq!(adapter.authorize().await.unwrap_err(), DulyNotedError::StateMismatch);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(store.get("githubOAuthState").await.unwrap(), Some(json!("newer-attempt")));
}

#[tokio::test]
async fn cancellation_is_reported_and_state_cleared() {
    let h = github(MockAuthorizer::cancelled());
    let err = h.adapter.authorize().await.unwrap_err();
    assert!(err.is_cancellation());
    assert_eq!(h.store.get("githubOAuthState").await.unwrap(), None);
}

#[tokio::test]
async fn provider_error_on_callback_is_surfaced() {
    let h = github(MockAuthorizer::redirecting_to(
        "http://127.0.0.1:8917/oauth/callback?error=access_denied&error_description=The+user+has+denied+your+application+access.",
    ));
    let err = h.adapter.authorize().await.unwrap_err();
    assert_eq!(err.user_message(), "The user has denied your application access.");
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn token_exchange_failure_stores_nothing() {
    let h = github(MockAuthorizer::approving(CALLBACK, "c1"));
    h.transport.push_json(200, json!({ "error": "bad_verification_code" }));

    let err = h.adapter.authorize().await.unwrap_err();
    assert!(matches!(err, DulyNotedError::TokenExchangeFailed { status: 200, .. }));
    assert!(h.store.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_configuration_fails_before_launch() {
    let mut config = AppConfig::default();
    config.oauth.github.client_id = "YOUR_GITHUB_CLIENT_ID".into();
    let h = harness(Provider::GitHub, &config, MockAuthorizer::approving(CALLBACK, "c1"));

    assert!(matches!(h.adapter.authorize().await, Err(DulyNotedError::Configuration(_))));
    assert!(h.authorizer.launched().is_empty());
    assert!(h.store.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn notion_direct_basic_auth_with_workspace_identity() {
    let mut config = AppConfig::default();
    config.oauth.notion.transport = TransportKind::DirectBasicAuth;
    config.oauth.notion.client_secret = Some("notion-secret".into());
    config.oauth.installation_id = Some("abcdefghijklmnop".into());
    let redirect_uri = "https://abcdefghijklmnop.chromiumapp.org/";

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new());
    let transport = MockTransport::new();
    transport.push_json(
        200,
        json!({
            "access_token": "secret_abc",
            "token_type": "bearer",
            "bot_id": "bot-1",
            "workspace_id": "ws-1",
            "workspace_name": "Team Notes",
            "workspace_icon": null,
            "owner": { "type": "user" }
        }),
    );
    let authorizer = MockAuthorizer::approving(redirect_uri, "n1");
    let engine = Arc::new(OAuthFlowEngine::new(
        Arc::new(transport.clone()),
        Arc::new(authorizer.clone()),
        clock.clone(),
    ));
    let adapter = ProviderAdapter::new(
        ProviderSettings::from_config(&config, Provider::Notion),
        engine,
        TokenStore::new(store.clone()),
        ResourceCache::new(store.clone(), clock.clone()),
        Arc::new(IdentityRedirect::new(config.oauth.installation_id.clone())),
        Arc::new(TokenResponseIdentity),
    );

    assert_eq!(adapter.workspace_info().await.unwrap(), None);
    let outcome = adapter.authorize().await.unwrap();
    assert_eq!(outcome.identity.account_label, "Team Notes");

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://api.notion.com/v1/oauth/token");
    assert_eq!(request.basic_auth, Some((config.oauth.notion.client_id.clone(), "notion-secret".into())));
    assert_eq!(
        request.body,
        json!({ "grant_type": "authorization_code", "code": "n1", "redirect_uri": redirect_uri })
    );

    let launched = url::Url::parse(&authorizer.launched()[0]).unwrap();
    assert!(launched.query_pairs().any(|(k, v)| k == "owner" && v == "user"));

    // Notion tokens carry no expiry and stay valid indefinitely
    clock.advance(Duration::days(365));
    assert!(adapter.is_authenticated().await.unwrap());
    assert_eq!(store.get("notionTokenExpiry").await.unwrap(), Some(serde_json::Value::Null));

    let workspace = adapter.workspace_info().await.unwrap().unwrap();
    assert_eq!(workspace.workspace_id.as_deref(), Some("ws-1"));
}
