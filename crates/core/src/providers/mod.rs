//! Per-provider adapters

pub mod adapter;
pub mod identity;

pub use adapter::{AuthorizationOutcome, ProviderAdapter, ProviderSettings};
pub use identity::TokenResponseIdentity;
