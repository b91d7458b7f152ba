//! SPARQL 1.1 protocol client
//!
//! Queries are POSTed form-encoded and answered in the SPARQL 1.1 Query
//! Results JSON format. Each binding `{"type": .., "value": ..}` is unwrapped
//! to its plain `value`.

use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{http_client, EndpointConfig, NoticeRecord, ResultTable, RetryPolicy};
use crate::errors::{FetchError, Result};
use crate::query::SparqlQuery;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Term types a binding may carry. `typed-literal` is the pre-1.1 spelling
/// some Virtuoso versions still emit.
const BINDING_TYPES: [&str; 5] = ["uri", "literal", "typed-literal", "bnode", "triple"];

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    head: Head,
    results: Option<Results>,
}

#[derive(Debug, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Results {
    bindings: Vec<HashMap<String, Binding>>,
}

#[derive(Debug, Deserialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

/// Client for one SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: EndpointConfig,
    retry: RetryPolicy,
}

impl SparqlClient {
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

    /// Run a SELECT query and return its rows.
    ///
    /// An empty solution sequence is `Ok` with an empty table, never an
    /// error.
    #[instrument(skip_all, fields(endpoint = %self.endpoint.url))]
    pub async fn select(&self, query: &SparqlQuery) -> std::result::Result<ResultTable, FetchError> {
        let table = self.retry.run(move || self.select_once(query)).await?;
        debug!(rows = table.len(), columns = table.columns().len(), "select complete");
        Ok(table)
    }

    async fn select_once(&self, query: &SparqlQuery) -> std::result::Result<ResultTable, FetchError> {
        let url = self.endpoint.url.as_str();
        let response = self
            .http
            .post(url)
            .timeout(self.endpoint.timeout)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query.as_str())])
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

        parse_results(url, &body)
    }
}

/// Decode a SPARQL JSON results document into a [`ResultTable`].
pub fn parse_results(endpoint: &str, body: &str) -> std::result::Result<ResultTable, FetchError> {
    let envelope: ResultsEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(endpoint, format!("invalid SPARQL results JSON: {}", e)))?;

    let results = envelope
        .results
        .ok_or_else(|| FetchError::malformed(endpoint, "missing results.bindings (not a SELECT result)"))?;

    let mut rows = Vec::with_capacity(results.bindings.len());
    for binding in results.bindings {
        let mut fields = Vec::with_capacity(binding.len());
        for (var, term) in binding {
            if !BINDING_TYPES.contains(&term.kind.as_str()) {
                return Err(FetchError::malformed(
                    endpoint,
                    format!("unknown binding type {:?} for ?{}", term.kind, var),
                ));
            }
            fields.push((var, term.value));
        }
        rows.push(NoticeRecord::from_iter(fields));
    }

    Ok(ResultTable::new(envelope.head.vars, rows))
}
