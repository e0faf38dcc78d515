//! # Duly Noted Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The retrying reqwest HTTP client and the token endpoint transport
//! - The SQLite-backed key-value store
//! - The loopback OAuth callback page
//! - GitHub and Notion API clients
//! - Configuration loading and provider wiring
//!
//! ## Architecture
//! - Implements traits defined in `dulynoted-core`
//! - Contains all "impure" code (I/O, network, browser)

pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
pub mod providers;
pub mod services;
pub mod storage;

pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use oauth::{
    BrowserLauncher, GitHubIdentityResolver, LaunchCanceller, LoopbackAuthorizer, ReqwestTokenTransport,
    SystemBrowser,
};
pub use providers::{open_store, redirect_resolver, Providers};
pub use services::{GitHubService, NotionService, PageParent};
pub use storage::SqliteKeyValueStore;
