//! Loopback callback page
//!
//! Serves the registered redirect URI on `127.0.0.1` for the duration of one
//! authorization attempt, opens the system browser on the authorization URL
//! and hands the full redirect URL back to the flow engine. State checking
//! is left to the engine; the page only captures what the provider sent.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{RawQuery, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use dulynoted_core::{parse_callback, InteractiveAuthorizer};
use dulynoted_domain::{DulyNotedError, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Duly Noted - Signed In</title></head>
<body><h1>Authorization Successful</h1><p>You can close this window and return to Duly Noted.</p></body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Duly Noted - Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>The provider did not grant access. You can close this window.</p></body>
</html>"#;

/// Opens a URL for the user
pub trait BrowserLauncher: Send + Sync {
    /// # Errors
    /// Any failure to hand the URL to a browser.
    fn open(&self, url: &str) -> Result<()>;
}

/// Default browser of the desktop session
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url)
            .map_err(|err| DulyNotedError::Internal(format!("failed to open browser: {err}")))
    }
}

#[derive(Clone)]
struct CallbackState {
    redirect_base: String,
    redirect_tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

/// Handle that aborts the launch currently waiting for a redirect
///
/// Every launch gets a fresh token, so cancelling one attempt leaves later
/// attempts unaffected. Cancelling while no launch is waiting does nothing.
#[derive(Clone, Default)]
pub struct LaunchCanceller {
    current: Arc<Mutex<CancellationToken>>,
}

impl LaunchCanceller {
    /// Abort the waiting launch with `AuthorizationCancelled`
    pub fn cancel(&self) {
        self.current.lock().cancel();
    }

    fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock() = token.clone();
        token
    }
}

/// [`InteractiveAuthorizer`] backed by a short-lived loopback HTTP server
pub struct LoopbackAuthorizer {
    port: u16,
    path: String,
    launcher: Arc<dyn BrowserLauncher>,
    canceller: LaunchCanceller,
}

impl LoopbackAuthorizer {
    pub fn new(port: u16, path: &str, launcher: Arc<dyn BrowserLauncher>) -> Self {
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
        Self { port, path, launcher, canceller: LaunchCanceller::default() }
    }

    #[must_use]
    pub fn canceller(&self) -> LaunchCanceller {
        self.canceller.clone()
    }

    /// The redirect URI served by this authorizer
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, self.path)
    }
}

#[async_trait]
impl InteractiveAuthorizer for LoopbackAuthorizer {
    async fn launch(&self, authorization_url: &str) -> Result<String> {
        let cancelled = self.canceller.begin();
        let listener = TcpListener::bind(("127.0.0.1", self.port)).await.map_err(|err| {
            DulyNotedError::Network(format!("failed to bind OAuth callback server: {err}"))
        })?;

        let (redirect_tx, redirect_rx) = oneshot::channel();
        let state = CallbackState {
            redirect_base: self.redirect_uri(),
            redirect_tx: Arc::new(Mutex::new(Some(redirect_tx))),
        };
        let app = Router::new().route(&self.path, get(handle_callback)).with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "OAuth callback server error");
            }
        });
        debug!(port = self.port, path = %self.path, "OAuth callback server listening");

        let outcome = match self.launcher.open(authorization_url) {
            Ok(()) => {
                info!("Waiting for the provider to redirect back");
                tokio::select! {
                    redirect = redirect_rx => redirect.map_err(|_| DulyNotedError::NoRedirect),
                    () = cancelled.cancelled() => Err(DulyNotedError::AuthorizationCancelled),
                }
            }
            Err(err) => Err(err),
        };

        let _ = shutdown_tx.send(());
        if let Err(err) = server.await {
            if err.is_panic() {
                return Err(DulyNotedError::Internal(format!(
                    "OAuth callback server panicked: {err}"
                )));
            }
        }

        outcome
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> Html<&'static str> {
    let redirect_url = match query.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => format!("{}?{query}", state.redirect_base),
        None => state.redirect_base.clone(),
    };
    let succeeded = parse_callback(&redirect_url).is_ok();

    // First callback wins; reloads of the page are answered but ignored
    if let Some(tx) = state.redirect_tx.lock().take() {
        let _ = tx.send(redirect_url);
    }

    Html(if succeeded { SUCCESS_PAGE } else { FAILURE_PAGE })
}
