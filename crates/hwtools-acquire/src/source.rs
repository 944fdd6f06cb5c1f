use crate::extract::PriceExtractor;
use hwtools_model::PriceResult;
use reqwest::{StatusCode, Url};
use std::future::Future;
use thiserror::Error;

const USER_AGENT: &str = "hwtools/0.1 (BOM price lookup)";

/// A failed price lookup. Row-level: callers log it and move on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid search URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request for {product_id} failed: {source}")]
    Transport {
        product_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {product_id} ({url})")]
    Status {
        product_id: String,
        url: String,
        status: StatusCode,
    },

    #[error("failed to read response body for {product_id}: {source}")]
    Body {
        product_id: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Product identifier the failed lookup was for, if the error is row-specific.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            FetchError::Transport { product_id, .. }
            | FetchError::Status { product_id, .. }
            | FetchError::Body { product_id, .. } => Some(product_id),
            FetchError::Client(_) | FetchError::InvalidUrl { .. } => None,
        }
    }
}

/// Looks up the quantity-1 unit price for a product identifier.
pub trait PriceSource {
    fn fetch_price(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<PriceResult, FetchError>>;
}

/// Fetches a vendor search page over HTTP and hands the markup to an extractor.
///
/// One GET per call: no retries, no caching, reqwest's default timeouts.
pub struct HttpPriceSource<E> {
    client: reqwest::Client,
    search_url: Url,
    query_key: String,
    extractor: E,
}

impl<E: PriceExtractor> HttpPriceSource<E> {
    pub fn new(search_url: &str, query_key: &str, extractor: E) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Self::with_client(client, search_url, query_key, extractor)
    }

    pub fn with_client(
        client: reqwest::Client,
        search_url: &str,
        query_key: &str,
        extractor: E,
    ) -> Result<Self, FetchError> {
        let parsed = Url::parse(search_url).map_err(|e| FetchError::InvalidUrl {
            url: search_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            search_url: parsed,
            query_key: query_key.to_string(),
            extractor,
        })
    }

    /// Search URL with the identifier percent-encoded into the query string.
    pub fn lookup_url(&self, product_id: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(&self.query_key, product_id);
        url
    }

    async fn fetch_page(&self, product_id: &str, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                product_id: product_id.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                product_id: product_id.to_string(),
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            product_id: product_id.to_string(),
            source,
        })
    }
}

impl<E: PriceExtractor> PriceSource for HttpPriceSource<E> {
    async fn fetch_price(&self, product_id: &str) -> Result<PriceResult, FetchError> {
        let url = self.lookup_url(product_id);
        tracing::info!(url = %url, product_id = %product_id, "Downloading price page");

        let html = self.fetch_page(product_id, url).await?;
        tracing::debug!(bytes = html.len(), "Received HTML");

        Ok(self.extractor.extract(&html))
    }
}
