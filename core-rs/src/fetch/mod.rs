//! Remote fetchers for the Cellar SPARQL endpoint and the TED search API
//!
//! Both clients return typed [`FetchError`](crate::errors::FetchError)s and
//! never turn a failed request into an empty table or a zero count.

pub mod retry;
pub mod sparql;
pub mod ted;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::errors::{CellarError, Result};

pub use retry::RetryPolicy;
pub use sparql::SparqlClient;
pub use ted::{TedClient, TedSearchResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where to send requests and how long to wait for each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("cellar-core-rs/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CellarError::Config(format!("failed to create HTTP client: {}", e)))
}

/// One result row: variable name to plain value.
///
/// Variables left unbound by the query (e.g. under `OPTIONAL`) are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NoticeRecord(BTreeMap<String, String>);

impl NoticeRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NoticeRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Rows of a SELECT result together with the variables the query asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<NoticeRecord>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<NoticeRecord>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[NoticeRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<NoticeRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct bound values of `field`, sorted.
    pub fn distinct(&self, field: &str) -> BTreeSet<&str> {
        self.rows.iter().filter_map(|row| row.get(field)).collect()
    }
}
