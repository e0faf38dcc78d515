//! # Duly Noted Domain
//!
//! Data model for provider sign-in and the resource cache.
//!
//! This crate contains:
//! - Provider, credential and token types
//! - The persisted storage key layout
//! - Configuration structures and defaults
//! - The error taxonomy and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other Duly Noted crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod keys;
pub mod macros;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
