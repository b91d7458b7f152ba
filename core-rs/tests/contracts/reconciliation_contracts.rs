// Reconciliation Contract Tests
//
// **Problem**: Dropping a row whose label is unknown makes the graph count
// disagree with the REST count for a reason nobody can see.
// **Solution**: Contract tests that pin counting and labelling rules.

use cellar_core::{LabelMap, LabelMaps, NoticeRecord, Reconciler, RestCount, UNKNOWN_LABEL};

const NT: &str = "http://publications.europa.eu/resource/authority/notice-type";

fn row(notice_type: &str) -> NoticeRecord {
    NoticeRecord::from_iter([
        ("publicationNumber".to_string(), "1-2025".to_string()),
        ("noticeTypeUri".to_string(), format!("{}/{}", NT, notice_type)),
    ])
}

fn labels() -> LabelMap {
    LabelMap::from_iter([
        (format!("{}/a", NT), "A"),
        (format!("{}/b", NT), "B"),
    ])
}

/// WHY: Zero rows is a valid day, not an error
/// REASON: Public holidays have no publications
/// BREAKS: Daily dashboards on quiet days
#[test]
fn zero_rows_reconcile_to_zero() {
    let nt = labels();
    let ft = LabelMap::default();
    let result = Reconciler::reconcile(
        &[],
        LabelMaps::new(&nt, &ft),
        RestCount::Counted(0),
        RestCount::NotAttempted,
    );

    assert_eq!(result.graph_count, 0);
    assert!(result.breakdown_by_type.is_empty());
}

/// WHY: Unknown URIs are labelled, counted and reported
/// REASON: The vocabulary lags behind new notice types
/// BREAKS: graph_count no longer equals the number of fetched rows
#[test]
fn unknown_uri_keeps_its_row() {
    let nt = labels();
    let ft = LabelMap::default();
    let rows = vec![row("a"), row("new-type")];
    let result = Reconciler::reconcile(
        &rows,
        LabelMaps::new(&nt, &ft),
        RestCount::Counted(2),
        RestCount::Counted(2),
    );

    assert_eq!(result.graph_count, 2);
    assert_eq!(result.breakdown_by_type.get(UNKNOWN_LABEL), Some(&1));
    assert_eq!(result.breakdown_by_type.values().sum::<u64>(), result.graph_count);
    assert!(result
        .unknown_labels
        .iter()
        .any(|u| u.uri.as_deref() == Some(&format!("{}/new-type", NT)[..])));
}

/// WHY: Rows [A, A, B] with REST counts 5 and 3
/// REASON: The reference reconciliation every dashboard is checked against
/// BREAKS: Any comparison between the graph and the REST API
#[test]
fn reference_reconciliation() {
    let nt = labels();
    let ft = LabelMap::default();
    let rows = vec![row("a"), row("a"), row("b")];
    let result = Reconciler::reconcile(
        &rows,
        LabelMaps::new(&nt, &ft),
        RestCount::Counted(5),
        RestCount::Counted(3),
    );

    assert_eq!(result.graph_count, 3);
    let breakdown: Vec<(String, u64)> = result.breakdown_by_type.clone().into_iter().collect();
    assert_eq!(breakdown, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
    assert_eq!(result.rest_count, RestCount::Counted(5));
    assert_eq!(result.rest_count_same_filter, RestCount::Counted(3));
}

/// WHY: An unknown REST count has no discrepancy
/// REASON: Unavailable is not zero
/// BREAKS: Outages look like a graph surplus
#[test]
fn unavailable_rest_count_has_no_discrepancy() {
    let nt = labels();
    let ft = LabelMap::default();
    let result = Reconciler::reconcile(
        &[row("a")],
        LabelMaps::new(&nt, &ft),
        RestCount::Unavailable {
            reason: "timeout".to_string(),
        },
        RestCount::NotAttempted,
    );

    assert_eq!(result.discrepancy(), None);
    assert_eq!(result.same_filter_discrepancy(), None);
    assert_eq!(result.rest_count.count(), None);
}
