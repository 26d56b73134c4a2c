//! # HTTP Item Store
//!
//! [`ItemStore`] over a remote REST backend.
//!
//! ```text
//! get     GET   {base}/orders/3/orderItems?_expand=product
//! create  POST  {base}/cartItems            body: record
//! update  PATCH {base}/orders/3             body: patch
//!
//! 2xx → record          404 → NotFound
//! other → Status        network / timeout → Transport
//! ```
//!
//! Requests are sent once. Timestamps are stamped by the backend.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::ItemStore;
use crate::error::{StoreError, StoreResult};
use crate::path::{Query, ResourcePath};

/// Connection settings for [`HttpItemStore`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpConfig {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST item store client.
#[derive(Debug, Clone)]
pub struct HttpItemStore {
    base_url: String,
    client: Client,
}

impl HttpItemStore {
    pub fn new(config: HttpConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(HttpItemStore {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a path, without query string.
    pub fn url(&self, path: &ResourcePath) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &ResourcePath,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> StoreResult<Value> {
        let url = self.url(path);
        debug!(%method, %url, "Item store request");

        let mut request = self.client.request(method, &url);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(&query.to_pairs());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "Item store request failed");
            StoreError::from(e)
        })?;
        read_response(path, response).await
    }
}

async fn read_response(path: &ResourcePath, response: Response) -> StoreResult<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Value>().await?);
    }

    let message = response.text().await.unwrap_or_default();
    Err(status_error(path, status.as_u16(), message))
}

fn status_error(path: &ResourcePath, status: u16, message: String) -> StoreError {
    match (status, path) {
        (404, ResourcePath::Item { collection, id }) => StoreError::not_found(collection, id),
        (404, other) => StoreError::not_found(other.target(), other),
        _ => StoreError::Status { status, message },
    }
}

#[async_trait]
impl ItemStore for HttpItemStore {
    async fn get(&self, path: &ResourcePath, query: &Query) -> StoreResult<Value> {
        self.send(Method::GET, path, Some(query), None).await
    }

    async fn create(&self, path: &ResourcePath, record: Value) -> StoreResult<Value> {
        self.send(Method::POST, path, None, Some(record)).await
    }

    async fn update(&self, path: &ResourcePath, patch: Value) -> StoreResult<Value> {
        self.send(Method::PATCH, path, None, Some(patch)).await
    }
}
