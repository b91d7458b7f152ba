// Query Builder Contract Tests
//
// These tests verify INVARIANTS of the generated SPARQL text.
//
// **Problem**: An untyped date literal or an always-false filter clause is
// still valid SPARQL. The endpoint answers with zero rows and nothing fails.
// **Solution**: Contract tests that pin the exact shape of dates and filters.

use cellar_core::{CellarError, DateWindow, NoticeTypeCode, QueryBuilder, QueryProfile, SparqlQuery};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn codes(values: &[&str]) -> BTreeSet<NoticeTypeCode> {
    values.iter().map(|v| NoticeTypeCode::new(*v).unwrap()).collect()
}

/// WHY: An inverted range must be rejected before any query text exists
/// REASON: Rendering `start > end` produces a query that matches nothing
/// BREAKS: Period dashboards show an empty chart instead of an error
#[test]
fn inverted_range_is_invalid_range() {
    let result = QueryBuilder::build_between(
        QueryProfile::NoticeCountsByDate,
        date(2025, 5, 24),
        date(2025, 5, 23),
        &BTreeSet::new(),
    );
    match result {
        Err(CellarError::InvalidRange { start, end }) => {
            assert_eq!(start, "2025-05-24");
            assert_eq!(end, "2025-05-23");
        }
        other => panic!("Expected InvalidRange, got {:?}", other),
    }

    assert!(DateWindow::new(date(2025, 5, 24), date(2025, 5, 23)).is_err());
}

/// WHY: Dates are compared as `xsd:date` typed literals
/// REASON: `?publicationDate = "2025-05-23"` compares a date with a string
///         and never matches; the store returns zero rows without error
/// BREAKS: Every daily count silently becomes zero
#[test]
fn single_day_uses_typed_date_literal() {
    let window = DateWindow::single_day(date(2025, 5, 23));
    for profile in [
        QueryProfile::DailyNotices,
        QueryProfile::NoticeCountsByDate,
        QueryProfile::CompetitionNotices,
    ] {
        let query = QueryBuilder::build(profile, &window, &BTreeSet::new()).unwrap();
        assert!(
            query.as_str().contains(r#"= "2025-05-23"^^xsd:date"#),
            "{} must compare against a typed date literal",
            profile
        );
        assert!(!query.as_str().contains(r#"= "2025-05-23")"#));
    }
}

/// WHY: An empty filter set means "no restriction"
/// REASON: Rendering an empty disjunction (`FILTER ()`) is a syntax error,
///         and rendering `FILTER (false)` drops every row
/// BREAKS: The unfiltered view of every dashboard
#[test]
fn empty_filter_set_omits_type_clause() {
    let window = DateWindow::new(date(2025, 5, 1), date(2025, 5, 31)).unwrap();
    let query = QueryBuilder::build(QueryProfile::DailyNotices, &window, &BTreeSet::new()).unwrap();

    assert!(!query.as_str().contains("?noticeTypeUri ="));
    assert!(!query.as_str().contains("||"));
    assert!(oxigraph::sparql::Query::parse(query.as_str(), None).is_ok());
}

/// WHY: A non-empty filter set is one disjunctive clause
/// REASON: Separate FILTERs would intersect, not unite, the notice types
/// BREAKS: Multi-type selections return zero rows
#[test]
fn filter_set_is_single_disjunction() {
    let window = DateWindow::single_day(date(2025, 5, 23));
    let query = QueryBuilder::build(
        QueryProfile::DailyNotices,
        &window,
        &codes(&["cn-standard", "can-standard"]),
    )
    .unwrap();

    assert_eq!(query.as_str().matches("?noticeTypeUri = <").count(), 2);
    assert_eq!(query.as_str().matches("FILTER (?noticeTypeUri").count(), 1);
    assert!(query.as_str().contains(
        "<http://publications.europa.eu/resource/authority/notice-type/can-standard> || ?noticeTypeUri = <http://publications.europa.eu/resource/authority/notice-type/cn-standard>"
    ));
}

/// WHY: Building is pure
/// REASON: Query text is shown to users and compared across runs; hidden
///         clock access or hash ordering would make it drift
/// BREAKS: Reproducibility of any reported number
#[test]
fn identical_inputs_give_identical_text() {
    let window = DateWindow::new(date(2025, 2, 1), date(2025, 4, 30)).unwrap();
    let first = QueryBuilder::build(
        QueryProfile::NoticeCountsByDate,
        &window,
        &codes(&["pin-only", "cn-standard", "veat"]),
    )
    .unwrap();
    let second = QueryBuilder::build(
        QueryProfile::NoticeCountsByDate,
        &window,
        &codes(&["veat", "pin-only", "cn-standard"]),
    )
    .unwrap();

    assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
}

/// WHY: Every generated query parses
/// REASON: The endpoint reports syntax errors as HTTP 400 with an HTML page
/// BREAKS: Diagnosis of endpoint failures
#[test]
fn every_profile_parses() {
    let window = DateWindow::new(date(2024, 12, 30), date(2025, 1, 2)).unwrap();
    for profile in QueryProfile::ALL {
        let query: SparqlQuery = QueryBuilder::build(profile, &window, &BTreeSet::new()).unwrap();
        assert!(
            oxigraph::sparql::Query::parse(query.as_str(), None).is_ok(),
            "{} does not parse",
            profile
        );
    }
}
