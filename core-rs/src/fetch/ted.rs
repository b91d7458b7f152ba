//! TED search API client.
//!
//! Only the total notice count is required from the response envelope. A
//! response without `totalNoticeCount` is malformed, not zero.

use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{http_client, EndpointConfig, RetryPolicy};
use crate::errors::{FetchError, Result};
use crate::query::TedSearchQuery;

/// Acceptance environment of the TED API v3.
pub const DEFAULT_TED_URL: &str = "https://api.acceptance.ted.europa.eu/v3/notices/search";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TedSearchResponse {
    pub total_notice_count: u64,
    /// Notices of the first result page, as returned.
    pub notices: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct TedClient {
    http: reqwest::Client,
    endpoint: EndpointConfig,
    retry: RetryPolicy,
}

impl TedClient {
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            endpoint,
            retry: RetryPolicy::none(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint.url, query = %query.query))]
    pub async fn search(&self, query: &TedSearchQuery) -> std::result::Result<TedSearchResponse, FetchError> {
        let response = self.retry.run(move || self.search_once(query)).await?;
        debug!(total = response.total_notice_count, "search complete");
        Ok(response)
    }

    /// Total number of notices matching `query`.
    pub async fn count(&self, query: &TedSearchQuery) -> std::result::Result<u64, FetchError> {
        Ok(self.search(query).await?.total_notice_count)
    }

    async fn search_once(&self, query: &TedSearchQuery) -> std::result::Result<TedSearchResponse, FetchError> {
        let url = self.endpoint.url.as_str();
        let response = self
            .http
            .post(url)
            .timeout(self.endpoint.timeout)
            .header(ACCEPT, "application/json")
            .json(query)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(url, &e))?;

        if !status.is_success() {
            return Err(FetchError::bad_status(url, status.as_u16(), &body));
        }

        parse_search_response(url, &body)
    }
}

pub fn parse_search_response(
    endpoint: &str,
    body: &str,
) -> std::result::Result<TedSearchResponse, FetchError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(endpoint, format!("invalid JSON: {}", e)))?;

    let total_notice_count = match json.get("totalNoticeCount") {
        Some(value) => value.as_u64().ok_or_else(|| {
            FetchError::malformed(
                endpoint,
                format!("totalNoticeCount is not a non-negative integer: {}", value),
            )
        })?,
        None => return Err(FetchError::malformed(endpoint, "missing totalNoticeCount")),
    };

    let notices = json
        .get("notices")
        .and_then(|n| n.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(TedSearchResponse {
        total_notice_count,
        notices,
    })
}
