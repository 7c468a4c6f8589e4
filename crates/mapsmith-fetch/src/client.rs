//! Content API client.

use std::time::Duration;

use async_trait::async_trait;
use mapsmith_core::{
    ApiResultSet, Config, ContentItem, ContentKind,
    config::{EndpointConfig, EndpointsConfig},
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::decode::{DecodeError, decode_collection};

/// Fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout or body read failure.
    #[error("request for {kind} failed: {source}")]
    Request {
        kind: ContentKind,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response.
    #[error("{kind} endpoint returned HTTP {status}")]
    Status { kind: ContentKind, status: u16 },

    /// Response body failed validation.
    #[error("invalid {kind} response: {source}")]
    Decode {
        kind: ContentKind,
        #[source]
        source: DecodeError,
    },
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Source of dynamic content for the sitemap.
///
/// `fetch_all` only fails for problems outside any single collection;
/// per-collection failures come back as empty collections.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch all four collections.
    async fn fetch_all(&self) -> Result<ApiResultSet>;
}

/// HTTP client for the content API.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: reqwest::Client,
    base_url: String,
    endpoints: EndpointsConfig,
    retries: u32,
}

impl ContentFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, config.api_base_url())
    }

    /// Create a fetcher pointing at a different API base URL.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .connect_timeout(config.fetch_timeout().min(Duration::from_secs(5)))
            .user_agent(concat!("mapsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints: config.api.endpoints.clone(),
            retries: config.api.retries,
        })
    }

    /// Full URL of a collection endpoint, without query parameters.
    pub fn endpoint_url(&self, kind: ContentKind) -> String {
        let path = self.endpoint(kind).path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }

    fn endpoint(&self, kind: ContentKind) -> &EndpointConfig {
        self.endpoints.get(kind)
    }

    /// Fetch one collection, retrying up to the configured number of times.
    pub async fn fetch_collection(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(kind).await {
                Ok(items) => return Ok(items),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    debug!(collection = %kind, attempt, error = %e, "retrying collection fetch");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        let url = self.endpoint_url(kind);
        debug!(collection = %kind, %url, "fetching collection");

        let response = self
            .client
            .get(&url)
            .query(&self.endpoint(kind).query)
            .send()
            .await
            .map_err(|source| FetchError::Request { kind, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                kind,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request { kind, source })?;

        decode_collection(kind, &body).map_err(|source| FetchError::Decode { kind, source })
    }
}

#[async_trait]
impl ContentSource for ContentFetcher {
    async fn fetch_all(&self) -> Result<ApiResultSet> {
        info!(base_url = %self.base_url, "fetching dynamic content");

        let handles: Vec<_> = ContentKind::ALL
            .into_iter()
            .map(|kind| {
                let fetcher = self.clone();
                (
                    kind,
                    tokio::spawn(async move { fetcher.fetch_collection(kind).await }),
                )
            })
            .collect();

        Ok(join_collections(handles).await)
    }
}

type CollectionTask = JoinHandle<Result<Vec<ContentItem>>>;

/// Await every collection task. A failed, panicked or cancelled task leaves
/// its collection empty and never touches the others.
async fn join_collections(handles: Vec<(ContentKind, CollectionTask)>) -> ApiResultSet {
    let mut results = ApiResultSet::default();

    for (kind, handle) in handles {
        match handle.await {
            Ok(Ok(items)) => {
                info!(collection = %kind, count = items.len(), "fetched collection");
                results.set(kind, items);
            }
            Ok(Err(e)) => {
                warn!(collection = %kind, error = %e, "collection fetch failed, using empty list");
            }
            Err(e) => {
                warn!(collection = %kind, error = %e, "collection task aborted, using empty list");
            }
        }
    }

    results
}
