//! # Duly Noted App
//!
//! Composition root and command-line front end.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Command handlers shared by the binary and its tests
//! - Tracing initialisation
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

pub use cli::{Cli, Command};
pub use commands::{execute, Output};
pub use context::{AppContext, ProviderStatus};
