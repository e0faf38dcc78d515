//! # Duly Noted Core
//!
//! Provider sign-in and resource caching - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (storage, token transport, interactive authorization)
//! - The provider-agnostic OAuth authorization-code flow
//! - Credential persistence and the TTL resource cache
//! - Per-provider adapters built on top of them
//!
//! ## Architecture Principles
//! - Only depends on `dulynoted-domain`
//! - No database, HTTP, or browser code
//! - All external dependencies via traits

pub mod cache;
pub mod clock;
pub mod oauth;
pub mod providers;
pub mod storage;
pub mod tokens;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::ResourceCache;
pub use clock::{Clock, SystemClock};
pub use oauth::ports::{
    IdentityResolver, InteractiveAuthorizer, RedirectUriResolver, TokenRequest, TokenTransport,
    TransportResponse,
};
pub use oauth::{
    build_authorization_url, generate_state, is_expired, parse_callback, CallbackPageRedirect,
    IdentityRedirect, OAuthFlowEngine,
};
pub use providers::{
    AuthorizationOutcome, ProviderAdapter, ProviderSettings, TokenResponseIdentity,
};
pub use storage::{KeyValueStore, MemoryStore};
pub use tokens::TokenStore;
