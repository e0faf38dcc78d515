//! Credential and pending-state persistence

pub mod store;

pub use store::TokenStore;
