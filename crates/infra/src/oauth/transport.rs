//! Token endpoint transport over reqwest

use async_trait::async_trait;
use dulynoted_core::{TokenRequest, TokenTransport, TransportResponse};
use dulynoted_domain::Result;
use reqwest::header::ACCEPT;
use reqwest::Method;

use crate::errors::conversions::to_domain;
use crate::http::HttpClient;

/// Posts token requests as JSON and hands the raw answer back to the flow
/// engine. Never retries.
#[derive(Clone)]
pub struct ReqwestTokenTransport {
    http: HttpClient,
}

impl ReqwestTokenTransport {
    /// # Errors
    /// `Network` when the underlying client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self { http: HttpClient::for_token_endpoint()? })
    }

    #[must_use]
    pub fn with_client(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenTransport for ReqwestTokenTransport {
    async fn post(&self, request: TokenRequest) -> Result<TransportResponse> {
        let mut builder = self
            .http
            .request(Method::POST, request.url.as_str())
            .header(ACCEPT, "application/json")
            .json(&request.body);

        if let Some((client_id, client_secret)) = &request.basic_auth {
            builder = builder.basic_auth(client_id, Some(client_secret));
        }

        let response = self.http.send(builder).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(to_domain)?;
        Ok(TransportResponse::new(status, body))
    }
}
