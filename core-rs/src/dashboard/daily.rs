//! Daily notice dashboard
//!
//! Notices published on one day, labelled and compared with the TED search
//! API count for the same day.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, instrument};

use super::Dashboard;
use crate::errors::Result;
use crate::query::{QueryBuilder, QueryProfile, SparqlQuery, TedSearchQuery, Vocabulary};
use crate::reconcile::{
    notice_types, LabelMaps, LabeledNotice, Reconciler, ReconciliationResult, RestCount,
};
use crate::window::DateWindow;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub query: SparqlQuery,
    pub ted_query: TedSearchQuery,
    /// Absent when the graph returned no notice types to filter on.
    pub ted_query_same_filter: Option<TedSearchQuery>,
    pub reconciliation: ReconciliationResult,
    pub notices: Vec<LabeledNotice>,
}

impl Dashboard {
    /// Run the daily dashboard for `date`.
    ///
    /// Graph rows, the TED day total and both vocabularies are fetched
    /// concurrently. A graph or vocabulary failure fails the run; a TED
    /// failure is reported as [`RestCount::Unavailable`].
    #[instrument(skip(self))]
    pub async fn daily(&self, date: NaiveDate) -> Result<DailyReport> {
        let window = DateWindow::single_day(date);
        let query = QueryBuilder::build(QueryProfile::DailyNotices, &window, &BTreeSet::new())?;
        let ted_query = TedSearchQuery::for_day(date, &BTreeSet::new());

        let (rows, rest_total, notice_labels, form_labels) = tokio::join!(
            self.sparql.select(&query),
            self.ted.count(&ted_query),
            self.labels.get(Vocabulary::NoticeType, &self.sparql),
            self.labels.get(Vocabulary::FormType, &self.sparql),
        );
        let rows = rows?.into_rows();
        let labels = LabelMaps::new(notice_labels?, form_labels?);
        let rest_total = RestCount::from_fetch(rest_total);

        let types = notice_types(&rows);
        let (ted_query_same_filter, rest_same_filter) = if types.is_empty() {
            (None, RestCount::NotAttempted)
        } else {
            let same_filter = TedSearchQuery::for_day(date, &types);
            let count = RestCount::from_fetch(self.ted.count(&same_filter).await);
            (Some(same_filter), count)
        };

        let reconciliation = Reconciler::reconcile(&rows, labels, rest_total, rest_same_filter);
        let notices = Reconciler::label_rows(&rows, labels);

        info!(
            graph = reconciliation.graph_count,
            rest = ?reconciliation.rest_count.count(),
            rest_same_filter = ?reconciliation.rest_count_same_filter.count(),
            unknown = reconciliation.unknown_labels.len(),
            unusable_types = reconciliation.unusable_notice_types.len(),
            "daily run complete"
        );

        Ok(DailyReport {
            date,
            query,
            ted_query,
            ted_query_same_filter,
            reconciliation,
            notices,
        })
    }
}
