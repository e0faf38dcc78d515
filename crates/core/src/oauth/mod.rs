//! OAuth2 authorization-code flow

pub mod authorization;
pub mod engine;
pub mod ports;
pub mod redirect;

pub use authorization::{build_authorization_url, generate_state, is_expired, parse_callback};
pub use engine::OAuthFlowEngine;
pub use redirect::{CallbackPageRedirect, IdentityRedirect};
