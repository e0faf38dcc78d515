//! Shared helpers for the command-line front end

pub mod browser;
pub mod logging;
