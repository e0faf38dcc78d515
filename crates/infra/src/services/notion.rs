//! Notion API client
//!
//! Page and block payloads are passed through as JSON; their layout is up
//! to the caller.

use std::sync::Arc;

use dulynoted_core::ProviderAdapter;
use dulynoted_domain::constants::NOTION_VERSION;
use dulynoted_domain::{CacheKey, Provider, ResourceKind, Result};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;
use urlencoding::encode;

use super::read_through;
use crate::http::HttpClient;

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<Value>,
}

/// Where a new page is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageParent {
    Page(String),
    Database(String),
}

impl PageParent {
    fn to_json(&self) -> Value {
        match self {
            Self::Page(id) => json!({ "page_id": id }),
            Self::Database(id) => json!({ "database_id": id }),
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Page(id) | Self::Database(id) => id,
        }
    }

    fn kind(&self) -> ResourceKind {
        match self {
            Self::Page(_) => ResourceKind::Pages,
            Self::Database(_) => ResourceKind::Databases,
        }
    }
}

/// Notion API client
pub struct NotionService {
    adapter: Arc<ProviderAdapter>,
    http: HttpClient,
    api_url: String,
}

impl NotionService {
    pub fn new(adapter: Arc<ProviderAdapter>, http: HttpClient) -> Self {
        let api_url = adapter.settings().client.api_url.trim_end_matches('/').to_string();
        Self { adapter, http, api_url }
    }

    /// Pages shared with the integration, optionally filtered by title
    pub async fn search_pages(&self, query: &str) -> Result<Vec<Value>> {
        let mut body = Map::new();
        body.insert("filter".into(), json!({ "property": "object", "value": "page" }));
        if !query.trim().is_empty() {
            body.insert("query".into(), json!(query.trim()));
        }
        self.search(Value::Object(body)).await
    }

    /// Databases shared with the integration
    pub async fn databases(&self, force_refresh: bool) -> Result<Vec<Value>> {
        let key = CacheKey::new(Provider::Notion, ResourceKind::Databases);
        read_through(self.adapter.cache(), &key, force_refresh, || {
            self.search(json!({ "filter": { "property": "object", "value": "database" } }))
        })
        .await
    }

    /// Create a page under `parent` and record the parent as recently used.
    /// `children` is omitted from the request when empty.
    pub async fn create_page(
        &self,
        parent: &PageParent,
        properties: Value,
        children: Vec<Value>,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("parent".into(), parent.to_json());
        body.insert(
            "properties".into(),
            if properties.is_null() { json!({}) } else { properties },
        );
        if !children.is_empty() {
            body.insert("children".into(), Value::Array(children));
        }

        let request =
            self.authorized(Method::POST, format!("{}/pages", self.api_url)).await?.json(&body);
        let page: Value = self.http.send_json(Provider::Notion, request).await?;
        info!("Notion page created");

        self.adapter
            .cache()
            .add_recently_used(Provider::Notion, parent.kind(), parent.id())
            .await?;
        Ok(page)
    }

    /// Append `blocks` to the end of a page
    pub async fn append_blocks(&self, page_id: &str, blocks: Vec<Value>) -> Result<Value> {
        let url = format!("{}/blocks/{}/children", self.api_url, encode(page_id));
        let request =
            self.authorized(Method::PATCH, url).await?.json(&json!({ "children": blocks }));
        self.http.send_json(Provider::Notion, request).await
    }

    async fn search(&self, body: Value) -> Result<Vec<Value>> {
        let request =
            self.authorized(Method::POST, format!("{}/search", self.api_url)).await?.json(&body);
        let response: SearchResults = self.http.send_json(Provider::Notion, request).await?;
        Ok(response.results)
    }

    async fn authorized(&self, method: Method, url: String) -> Result<RequestBuilder> {
        let token = self.adapter.require_access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token).header("Notion-Version", NOTION_VERSION))
    }
}
