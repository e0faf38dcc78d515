//! OAuth adapters: token endpoint transport, loopback callback page and
//! account identity lookup

pub mod identity;
pub mod loopback;
pub mod transport;

pub use identity::GitHubIdentityResolver;
pub use loopback::{BrowserLauncher, LaunchCanceller, LoopbackAuthorizer, SystemBrowser};
pub use transport::ReqwestTokenTransport;
