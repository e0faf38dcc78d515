//! Test doubles for the core ports
//!
//! Available to other crates through the `test-utils` feature.

// Mocks are simple by design; their failure modes are visible in signatures
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod mocks;

pub use mocks::{MockAuthorizer, MockClock, MockTransport, StaticIdentity};
