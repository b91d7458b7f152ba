//! Process-lifetime cache of vocabulary labels
//!
//! Each vocabulary is fetched at most once. Concurrent first lookups share
//! a single request; a failed fetch leaves the slot empty so the next run
//! tries again.

use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::info;

use crate::errors::{FetchError, Result};
use crate::fetch::{ResultTable, SparqlClient};
use crate::query::{SparqlQuery, Vocabulary};

/// Label used for a URI that has no entry in its vocabulary.
pub const UNKNOWN_LABEL: &str = "(unknown)";

/// Default language of `skos:prefLabel`.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Read-only URI → label table of one vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelMap {
    labels: HashMap<String, String>,
}

impl LabelMap {
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.labels.get(uri).map(String::as_str)
    }

    /// Label for `uri`, or [`UNKNOWN_LABEL`] when the vocabulary has none.
    pub fn resolve(&self, uri: &str) -> &str {
        self.get(uri).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Build from the rows of a vocabulary label query.
    ///
    /// Every row must bind both the concept variable and `?label`; a row
    /// missing either means the endpoint did not answer the query that was
    /// sent.
    pub fn from_table(
        vocabulary: Vocabulary,
        table: &ResultTable,
        endpoint: &str,
    ) -> std::result::Result<Self, FetchError> {
        let var = vocabulary.uri_variable();
        let mut labels = HashMap::with_capacity(table.len());
        for row in table.rows() {
            match (row.get(var), row.get("label")) {
                (Some(uri), Some(label)) => {
                    labels.insert(uri.to_string(), label.to_string());
                }
                _ => {
                    return Err(FetchError::malformed(
                        endpoint,
                        format!("{} label row without ?{} or ?label", vocabulary, var),
                    ))
                }
            }
        }
        Ok(Self { labels })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Explicitly owned label cache, shared between runs behind an `Arc`.
#[derive(Debug)]
pub struct LabelCache {
    language: String,
    notice_types: OnceCell<LabelMap>,
    form_types: OnceCell<LabelMap>,
}

impl Default for LabelCache {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl LabelCache {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            notice_types: OnceCell::new(),
            form_types: OnceCell::new(),
        }
    }

    /// A cache whose vocabularies are already loaded.
    pub fn preloaded(notice_types: LabelMap, form_types: LabelMap) -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            notice_types: OnceCell::from(notice_types),
            form_types: OnceCell::from(form_types),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_loaded(&self, vocabulary: Vocabulary) -> bool {
        self.slot(vocabulary).initialized()
    }

    /// Labels of `vocabulary`, fetching them on first use.
    pub async fn get(&self, vocabulary: Vocabulary, client: &SparqlClient) -> Result<&LabelMap> {
        self.slot(vocabulary)
            .get_or_try_init(|| self.fetch(vocabulary, client))
            .await
    }

    async fn fetch(&self, vocabulary: Vocabulary, client: &SparqlClient) -> Result<LabelMap> {
        let query = SparqlQuery::vocabulary_labels(vocabulary, &self.language)?;
        let table = client.select(&query).await?;
        let map = LabelMap::from_table(vocabulary, &table, &client.endpoint().url)?;
        info!(vocabulary = %vocabulary, labels = map.len(), "vocabulary labels cached");
        Ok(map)
    }

    fn slot(&self, vocabulary: Vocabulary) -> &OnceCell<LabelMap> {
        match vocabulary {
            Vocabulary::NoticeType => &self.notice_types,
            Vocabulary::FormType => &self.form_types,
        }
    }
}
