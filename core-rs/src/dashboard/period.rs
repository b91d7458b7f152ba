//! Period dashboard
//!
//! Notice counts per publication date and per notice type over a window,
//! next to the Cellar ingestion activity for the same window.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument, warn};

use super::{count_field, date_field, Dashboard};
use crate::cache::{LabelMap, UNKNOWN_LABEL};
use crate::errors::Result;
use crate::fetch::NoticeRecord;
use crate::query::{NoticeTypeCode, QueryBuilder, QueryProfile, SparqlQuery, Vocabulary};
use crate::reconcile::UnknownLabel;
use crate::window::DateWindow;

/// Cellar ingestion on one upload day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDay {
    pub date_updated: NaiveDate,
    pub min_publication_date: NaiveDate,
    pub max_publication_date: NaiveDate,
    pub document_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub window: DateWindow,
    pub counts_query: SparqlQuery,
    pub activity_query: SparqlQuery,
    pub total: u64,
    pub by_date: BTreeMap<NaiveDate, u64>,
    /// Notice-type label → documents, in lexicographic label order.
    pub by_type: BTreeMap<String, u64>,
    /// Publication date → notice-type label → documents. Lets a renderer
    /// show the type mix of any sub-range of the window.
    pub by_date_and_type: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
    pub unknown_labels: Vec<UnknownLabel>,
    pub activity: Vec<PipelineDay>,
}

/// Sums of a `NoticeCountsByDate` result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountSummary {
    pub total: u64,
    pub by_date: BTreeMap<NaiveDate, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub by_date_and_type: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
    pub unknown_labels: Vec<UnknownLabel>,
}

impl CountSummary {
    pub fn from_rows(rows: &[NoticeRecord], notice_types: &LabelMap) -> Result<Self> {
        let var = Vocabulary::NoticeType.uri_variable();
        let mut summary = Self::default();
        let mut unknown: BTreeMap<Option<String>, u64> = BTreeMap::new();

        for row in rows {
            let count = count_field(row, "documentCount")?;
            let date = date_field(row, "publicationDate")?;
            let uri = row.get(var);
            let label = match uri.and_then(|uri| notice_types.get(uri)) {
                Some(label) => label,
                None => {
                    *unknown.entry(uri.map(str::to_string)).or_insert(0) += 1;
                    UNKNOWN_LABEL
                }
            };

            summary.total += count;
            *summary.by_date.entry(date).or_insert(0) += count;
            *summary.by_type.entry(label.to_string()).or_insert(0) += count;
            *summary
                .by_date_and_type
                .entry(date)
                .or_default()
                .entry(label.to_string())
                .or_insert(0) += count;
        }

        summary.unknown_labels = unknown
            .into_iter()
            .map(|(uri, rows)| UnknownLabel {
                vocabulary: Vocabulary::NoticeType,
                uri,
                rows,
            })
            .collect();
        for u in &summary.unknown_labels {
            warn!(uri = u.uri.as_deref().unwrap_or("<unbound>"), rows = u.rows, "unknown notice type label");
        }
        Ok(summary)
    }
}

/// Rows of a `PipelineActivity` result, in upload-day order.
pub fn pipeline_days(rows: &[NoticeRecord]) -> Result<Vec<PipelineDay>> {
    let mut days = rows
        .iter()
        .map(|row| -> Result<PipelineDay> {
            Ok(PipelineDay {
                date_updated: date_field(row, "dateUpdated")?,
                min_publication_date: date_field(row, "minPublicationDate")?,
                max_publication_date: date_field(row, "maxPublicationDate")?,
                document_count: count_field(row, "documentCount")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    days.sort_by_key(|day| day.date_updated);
    Ok(days)
}

impl Dashboard {
    /// Run the period dashboard over `window`.
    ///
    /// `filters` restricts the notice counts; upload activity is never
    /// filtered by notice type.
    #[instrument(skip_all, fields(window = %window, filters = filters.len()))]
    pub async fn period(
        &self,
        window: &DateWindow,
        filters: &BTreeSet<NoticeTypeCode>,
    ) -> Result<PeriodReport> {
        let counts_query = QueryBuilder::build(QueryProfile::NoticeCountsByDate, window, filters)?;
        let activity_query =
            QueryBuilder::build(QueryProfile::PipelineActivity, window, &BTreeSet::new())?;

        let (counts, activity, notice_labels) = tokio::join!(
            self.sparql.select(&counts_query),
            self.sparql.select(&activity_query),
            self.labels.get(Vocabulary::NoticeType, &self.sparql),
        );
        let counts = counts?;
        let activity = activity?;
        let summary = CountSummary::from_rows(counts.rows(), notice_labels?)?;
        let activity = pipeline_days(activity.rows())?;

        info!(
            total = summary.total,
            days = summary.by_date.len(),
            upload_days = activity.len(),
            "period run complete"
        );

        Ok(PeriodReport {
            window: *window,
            counts_query,
            activity_query,
            total: summary.total,
            by_date: summary.by_date,
            by_type: summary.by_type,
            by_date_and_type: summary.by_date_and_type,
            unknown_labels: summary.unknown_labels,
            activity,
        })
    }
}
