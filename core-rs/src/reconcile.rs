//! Reconciliation of graph rows with labels and REST counts
//!
//! The reconciler is pure: it takes rows already fetched, label maps
//! already cached and REST counts already resolved, and produces one
//! comparison record. Rows are never dropped. URIs without a label resolve
//! to [`UNKNOWN_LABEL`] and are reported in
//! [`ReconciliationResult::unknown_labels`].

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::cache::{LabelMap, UNKNOWN_LABEL};
use crate::errors::FetchError;
use crate::fetch::NoticeRecord;
use crate::query::{NoticeTypeCode, Vocabulary};

/// Public detail page of a notice on TED.
pub const TED_NOTICE_URL: &str = "https://ted.europa.eu/en/notice/-/detail";

pub fn ted_notice_url(publication_number: &str) -> String {
    format!("{}/{}", TED_NOTICE_URL, publication_number)
}

/// Outcome of one REST count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestCount {
    Counted(u64),
    /// The request was not sent (e.g. no notice types to filter on).
    NotAttempted,
    /// The request failed; the rest of the report is still valid.
    Unavailable { reason: String },
}

impl RestCount {
    pub fn count(&self) -> Option<u64> {
        match self {
            RestCount::Counted(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, RestCount::Counted(_))
    }

    pub fn from_fetch(result: std::result::Result<u64, FetchError>) -> Self {
        match result {
            Ok(n) => RestCount::Counted(n),
            Err(err) => {
                warn!(endpoint = err.endpoint(), error = %err, "REST count unavailable");
                RestCount::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// A URI that had no entry in its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownLabel {
    pub vocabulary: Vocabulary,
    /// `None` when the row did not bind the variable at all.
    pub uri: Option<String>,
    /// Number of rows carrying this URI.
    pub rows: u64,
}

/// Both label maps a run resolves against.
#[derive(Debug, Clone, Copy)]
pub struct LabelMaps<'a> {
    pub notice_types: &'a LabelMap,
    pub form_types: &'a LabelMap,
}

impl<'a> LabelMaps<'a> {
    pub fn new(notice_types: &'a LabelMap, form_types: &'a LabelMap) -> Self {
        Self {
            notice_types,
            form_types,
        }
    }

    pub fn for_vocabulary(&self, vocabulary: Vocabulary) -> &'a LabelMap {
        match vocabulary {
            Vocabulary::NoticeType => self.notice_types,
            Vocabulary::FormType => self.form_types,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub graph_count: u64,
    pub rest_count: RestCount,
    pub rest_count_same_filter: RestCount,
    /// Notice-type label → rows, in lexicographic label order.
    pub breakdown_by_type: BTreeMap<String, u64>,
    /// Form-type label → rows, in lexicographic label order.
    pub breakdown_by_form: BTreeMap<String, u64>,
    /// Distinct notice-type codes found in the rows.
    pub notice_types: BTreeSet<NoticeTypeCode>,
    /// Notice-type URIs with no usable code, with their row counts. These
    /// rows are in `graph_count` but outside the same-filter REST query.
    pub unusable_notice_types: BTreeMap<String, u64>,
    pub unknown_labels: Vec<UnknownLabel>,
}

impl ReconciliationResult {
    /// `graph_count - rest_count`, when the REST count is known.
    pub fn discrepancy(&self) -> Option<i64> {
        self.rest_count
            .count()
            .map(|rest| self.graph_count as i64 - rest as i64)
    }

    /// `graph_count - rest_count_same_filter`, when that count is known.
    pub fn same_filter_discrepancy(&self) -> Option<i64> {
        self.rest_count_same_filter
            .count()
            .map(|rest| self.graph_count as i64 - rest as i64)
    }

    /// The graph count equals the same-filter REST count.
    ///
    /// The unfiltered `rest_count` is not compared; it also covers notice
    /// types the graph does not carry.
    pub fn is_consistent(&self) -> bool {
        self.same_filter_discrepancy() == Some(0)
    }
}

/// One row of the daily results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledNotice {
    pub publication_number: Option<String>,
    pub notice_type: String,
    pub form_type: String,
    pub url: Option<String>,
}

/// Distinct notice-type codes of `rows`.
///
/// URIs whose last segment is not a valid code are skipped; they still
/// count in the breakdowns and are reported as
/// [`ReconciliationResult::unusable_notice_types`].
pub fn notice_types(rows: &[NoticeRecord]) -> BTreeSet<NoticeTypeCode> {
    scan_notice_types(rows).0
}

fn scan_notice_types(rows: &[NoticeRecord]) -> (BTreeSet<NoticeTypeCode>, BTreeMap<String, u64>) {
    let var = Vocabulary::NoticeType.uri_variable();
    let mut uris: BTreeMap<&str, u64> = BTreeMap::new();
    for uri in rows.iter().filter_map(|row| row.get(var)) {
        *uris.entry(uri).or_insert(0) += 1;
    }

    let mut codes = BTreeSet::new();
    let mut unusable = BTreeMap::new();
    for (uri, rows) in uris {
        match NoticeTypeCode::from_uri(uri) {
            Ok(code) => {
                codes.insert(code);
            }
            Err(_) => {
                warn!(uri, rows, "notice type URI without a usable code");
                unusable.insert(uri.to_string(), rows);
            }
        }
    }
    (codes, unusable)
}

pub struct Reconciler;

impl Reconciler {
    pub fn reconcile(
        rows: &[NoticeRecord],
        labels: LabelMaps<'_>,
        rest_total: RestCount,
        rest_total_same_filter: RestCount,
    ) -> ReconciliationResult {
        let mut unknown: BTreeMap<(Vocabulary, Option<String>), u64> = BTreeMap::new();
        let mut breakdown_by_type = BTreeMap::new();
        let mut breakdown_by_form = BTreeMap::new();

        for row in rows {
            for vocabulary in Vocabulary::ALL {
                let label = resolve(row, vocabulary, labels, &mut unknown);
                let breakdown = match vocabulary {
                    Vocabulary::NoticeType => &mut breakdown_by_type,
                    Vocabulary::FormType => &mut breakdown_by_form,
                };
                *breakdown.entry(label.to_string()).or_insert(0u64) += 1;
            }
        }

        let unknown_labels: Vec<UnknownLabel> = unknown
            .into_iter()
            .map(|((vocabulary, uri), rows)| UnknownLabel {
                vocabulary,
                uri,
                rows,
            })
            .collect();
        for u in &unknown_labels {
            warn!(
                vocabulary = %u.vocabulary,
                uri = u.uri.as_deref().unwrap_or("<unbound>"),
                rows = u.rows,
                "unknown label"
            );
        }

        let (notice_types, unusable_notice_types) = scan_notice_types(rows);

        ReconciliationResult {
            graph_count: rows.len() as u64,
            rest_count: rest_total,
            rest_count_same_filter: rest_total_same_filter,
            breakdown_by_type,
            breakdown_by_form,
            notice_types,
            unusable_notice_types,
            unknown_labels,
        }
    }

    /// Rows of the daily results table, in input order.
    pub fn label_rows(rows: &[NoticeRecord], labels: LabelMaps<'_>) -> Vec<LabeledNotice> {
        rows.iter()
            .map(|row| {
                let publication_number = row.get("publicationNumber").map(str::to_string);
                LabeledNotice {
                    url: publication_number.as_deref().map(ted_notice_url),
                    publication_number,
                    notice_type: label_of(row, Vocabulary::NoticeType, labels).to_string(),
                    form_type: label_of(row, Vocabulary::FormType, labels).to_string(),
                }
            })
            .collect()
    }
}

fn label_of<'a>(row: &NoticeRecord, vocabulary: Vocabulary, labels: LabelMaps<'a>) -> &'a str {
    match row.get(vocabulary.uri_variable()) {
        Some(uri) => labels.for_vocabulary(vocabulary).resolve(uri),
        None => UNKNOWN_LABEL,
    }
}

fn resolve<'a>(
    row: &NoticeRecord,
    vocabulary: Vocabulary,
    labels: LabelMaps<'a>,
    unknown: &mut BTreeMap<(Vocabulary, Option<String>), u64>,
) -> &'a str {
    let uri = row.get(vocabulary.uri_variable());
    match uri.and_then(|uri| labels.for_vocabulary(vocabulary).get(uri)) {
        Some(label) => label,
        None => {
            *unknown
                .entry((vocabulary, uri.map(str::to_string)))
                .or_insert(0) += 1;
            UNKNOWN_LABEL
        }
    }
}
