//! GitHub account lookup after the code exchange

use async_trait::async_trait;
use dulynoted_core::IdentityResolver;
use dulynoted_domain::constants::GITHUB_ACCEPT;
use dulynoted_domain::{Identity, Provider, Result, TokenResponse};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::Deserialize;

use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

/// Resolves the signed-in GitHub login with `GET /user`
#[derive(Clone)]
pub struct GitHubIdentityResolver {
    http: HttpClient,
    api_url: String,
}

impl GitHubIdentityResolver {
    pub fn new(http: HttpClient, api_url: impl Into<String>) -> Self {
        Self { http, api_url: api_url.into().trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl IdentityResolver for GitHubIdentityResolver {
    async fn resolve(&self, token: &TokenResponse) -> Result<Identity> {
        let request = self
            .http
            .request(Method::GET, format!("{}/user", self.api_url))
            .bearer_auth(&token.access_token)
            .header(ACCEPT, GITHUB_ACCEPT);
        let user: GitHubUser = self.http.send_json(Provider::GitHub, request).await?;
        Ok(Identity::new(user.login))
    }
}
