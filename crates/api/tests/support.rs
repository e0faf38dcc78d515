#![allow(dead_code)]

use std::sync::Arc;

use dulynoted_core::testing::{MockAuthorizer, MockClock, MockTransport};
use dulynoted_core::{InteractiveAuthorizer, KeyValueStore, MemoryStore, OAuthFlowEngine};
use dulynoted_domain::AppConfig;
use dulynoted_infra::{HttpClient, LaunchCanceller};
use dulynoted_lib::AppContext;

pub const CALLBACK: &str = "http://127.0.0.1:8917/oauth/callback";

/// Context wired to in-memory doubles with both APIs pointed at `api_url`
pub struct TestApp {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub transport: MockTransport,
    pub clock: Arc<MockClock>,
}

impl TestApp {
    pub fn new(api_url: &str, authorizer: MockAuthorizer) -> Self {
        Self::with_authorizer(api_url, Arc::new(authorizer), LaunchCanceller::default(), |_| {})
    }

    pub fn with_authorizer(
        api_url: &str,
        authorizer: Arc<dyn InteractiveAuthorizer>,
        cancel: LaunchCanceller,
        customize: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let mut config = AppConfig::default().with_provider_defaults();
        config.oauth.github.api_url = api_url.to_string();
        config.oauth.notion.api_url = api_url.to_string();
        config.oauth.installation_id = Some("abcdefghijklmnop".into());
        customize(&mut config);

        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new());
        let transport = MockTransport::new();
        let engine =
            Arc::new(OAuthFlowEngine::new(Arc::new(transport.clone()), authorizer, clock.clone()));
        let http = HttpClient::builder()
            .base_backoff(std::time::Duration::from_millis(1))
            .build()
            .unwrap();
        let kv: Arc<dyn KeyValueStore> = store.clone();
        let ctx = AppContext::from_parts(config, kv, engine, clock.clone(), &http, cancel);

        Self { ctx, store, transport, clock }
    }
}
