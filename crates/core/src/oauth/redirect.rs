//! Redirect URI resolvers

use dulynoted_domain::{DulyNotedError, Result};

use super::ports::RedirectUriResolver;

/// A hosted callback page at a fixed URL
#[derive(Debug, Clone)]
pub struct CallbackPageRedirect {
    url: String,
}

impl CallbackPageRedirect {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Callback page served on the loopback interface
    #[must_use]
    pub fn loopback(port: u16, path: &str) -> Self {
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
        Self::new(format!("http://127.0.0.1:{port}{path}"))
    }
}

impl RedirectUriResolver for CallbackPageRedirect {
    fn redirect_uri(&self) -> Result<String> {
        Ok(self.url.clone())
    }
}

/// The host identity redirect, `https://{installation-id}.chromiumapp.org/`
#[derive(Debug, Clone)]
pub struct IdentityRedirect {
    installation_id: Option<String>,
}

impl IdentityRedirect {
    #[must_use]
    pub fn new(installation_id: Option<String>) -> Self {
        Self { installation_id }
    }
}

impl RedirectUriResolver for IdentityRedirect {
    fn redirect_uri(&self) -> Result<String> {
        let id = self
            .installation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                DulyNotedError::Configuration(
                    "identity redirect requires oauth.installation_id".to_string(),
                )
            })?;
        Ok(format!("https://{id}.chromiumapp.org/"))
    }
}
