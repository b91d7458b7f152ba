/**
 * dashboard module
 *
 * - daily: one day of notices reconciled against TED counts
 * - period: notice counts and Cellar upload activity over a window
 * - competition: calls for competition per buyer country
 *
 * A `Dashboard` owns both clients and the label cache. Reports are plain
 * value objects, rendering is left to the caller.
 */

pub mod competition;
pub mod daily;
pub mod period;

use chrono::NaiveDate;
use std::sync::Arc;

use crate::cache::LabelCache;
use crate::config::CellarConfig;
use crate::errors::{CellarError, Result};
use crate::fetch::{NoticeRecord, SparqlClient, TedClient};
use crate::window::parse_date;

pub use competition::{CompetitionNotice, CompetitionReport};
pub use daily::DailyReport;
pub use period::{PeriodReport, PipelineDay};

pub struct Dashboard {
    sparql: SparqlClient,
    ted: TedClient,
    labels: Arc<LabelCache>,
}

impl Dashboard {
    pub fn new(sparql: SparqlClient, ted: TedClient, labels: Arc<LabelCache>) -> Self {
        Self { sparql, ted, labels }
    }

    /// Build clients, retry policy and an empty label cache from `config`.
    pub fn from_config(config: &CellarConfig) -> Result<Self> {
        let retry = config.spec.retry.policy();
        let sparql = SparqlClient::new(config.spec.sparql.endpoint())?.with_retry(retry);
        let ted = TedClient::new(config.spec.ted.endpoint())?.with_retry(retry);
        let labels = Arc::new(LabelCache::new(config.spec.labels.language.clone()));
        Ok(Self::new(sparql, ted, labels))
    }

    /// Share an existing label cache, e.g. between dashboards of one process.
    pub fn with_labels(mut self, labels: Arc<LabelCache>) -> Self {
        self.labels = labels;
        self
    }

    pub fn labels(&self) -> &Arc<LabelCache> {
        &self.labels
    }

    pub fn sparql(&self) -> &SparqlClient {
        &self.sparql
    }

    pub fn ted(&self) -> &TedClient {
        &self.ted
    }
}

/// Required field of a result row.
pub(crate) fn required<'a>(row: &'a NoticeRecord, field: &str) -> Result<&'a str> {
    row.get(field).ok_or_else(|| CellarError::InvalidValue {
        field: field.to_string(),
        value: "<unbound>".to_string(),
    })
}

/// Non-negative integer count of a result row.
pub(crate) fn count_field(row: &NoticeRecord, field: &str) -> Result<u64> {
    let value = required(row, field)?;
    value.trim().parse().map_err(|_| CellarError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Calendar date of a result row. Virtuoso may append a timezone to
/// `xsd:date` values (`2025-05-23Z`, `2025-05-23+02:00`); it is dropped.
pub(crate) fn date_field(row: &NoticeRecord, field: &str) -> Result<NaiveDate> {
    let value = required(row, field)?;
    let day = value.get(..10).unwrap_or(value);
    let suffix = value.get(10..).unwrap_or("");
    let zoned = suffix.is_empty() || suffix.starts_with(['Z', '+', '-']);
    match parse_date(day) {
        Ok(date) if zoned => Ok(date),
        _ => Err(CellarError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
