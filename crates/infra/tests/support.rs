#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use dulynoted_core::testing::{MockAuthorizer, MockClock, MockTransport, StaticIdentity};
use dulynoted_core::{
    CallbackPageRedirect, MemoryStore, OAuthFlowEngine, ProviderAdapter, ProviderSettings,
    ResourceCache, TokenStore,
};
use dulynoted_domain::{AppConfig, Credential, Provider};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

pub const CALLBACK: &str = "http://127.0.0.1:8917/oauth/callback";

/// Adapter wired to in-memory doubles, pointed at `api_url`
pub struct TestProvider {
    pub adapter: Arc<ProviderAdapter>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MockClock>,
    pub transport: MockTransport,
}

impl TestProvider {
    pub fn new(provider: Provider, api_url: &str, authorizer: MockAuthorizer) -> Self {
        let mut config = AppConfig::default().with_provider_defaults();
        config.provider_mut(provider).api_url = api_url.to_string();

        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new());
        let transport = MockTransport::new();
        let engine = Arc::new(OAuthFlowEngine::new(
            Arc::new(transport.clone()),
            Arc::new(authorizer),
            clock.clone(),
        ));
        let adapter = Arc::new(ProviderAdapter::new(
            ProviderSettings::from_config(&config, provider),
            engine,
            TokenStore::new(store.clone()),
            ResourceCache::new(store.clone(), clock.clone()),
            Arc::new(CallbackPageRedirect::new(CALLBACK)),
            Arc::new(StaticIdentity::new("octocat")),
        ));

        Self { adapter, store, clock, transport }
    }

    /// Already signed in with a non-expiring `access_token`
    pub async fn signed_in(provider: Provider, api_url: &str, access_token: &str) -> Self {
        let this = Self::new(provider, api_url, MockAuthorizer::cancelled());
        let credential = Credential {
            access_token: access_token.to_string(),
            expires_at: None,
            refresh_token: None,
            account_label: Some("octocat".into()),
        };
        TokenStore::new(this.store.clone()).save(provider, &credential).await.unwrap();
        this
    }
}

/// Shared in-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture every event on the current thread until the guard drops
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(buffer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
