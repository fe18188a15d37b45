//! HTTP page source
//!
//! Issues `GET {base_url}{path}?page=N&limit=L` and decodes the JSON array
//! the resource answers with.

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::pagination::PageRequest;
use crate::types::Item;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Something that can fetch one page of items
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page. An empty vector means there is no more data.
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>> {
        (**self).fetch_page(request).await
    }
}

/// Page source backed by a reqwest client
pub struct HttpPageSource {
    client: Client,
    endpoint: Url,
    headers: HashMap<String, String>,
    timeout: Duration,
}

impl HttpPageSource {
    /// Create a page source from the feed configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: build_endpoint(&config.base_url, &config.path)?,
            headers: config.headers.clone(),
            timeout: config.timeout(),
        })
    }

    /// Pagination endpoint without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL of one page
    pub fn page_url(&self, request: PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        let mut params: Vec<_> = request.query_params().into_iter().collect();
        params.sort();
        url.query_pairs_mut().extend_pairs(params);
        url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>> {
        let url = self.page_url(request);
        let mut req = self.client.get(url.clone());
        for (key, value) in &self.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let items = decode_page(&body)?;
        debug!("GET {} -> {} items", url, items.len());
        Ok(items)
    }
}

impl std::fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Join the base URL and the endpoint path
fn build_endpoint(base_url: &str, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Decode a page body, which must be a JSON array
pub(crate) fn decode_page(body: &str) -> Result<Vec<Item>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| Error::decode(format!("invalid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Err(Error::decode("expected a JSON array, got an object")),
        other => Err(Error::decode(format!("expected a JSON array, got {other}"))),
    }
}
