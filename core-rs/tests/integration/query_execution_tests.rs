//! Integration tests executing generated queries
//!
//! Loads a small TriG sample into an in-memory oxigraph store and runs the
//! query profiles against it, so date typing and filter clauses are checked
//! by a SPARQL engine rather than by string inspection.

use cellar_core::dashboard::period::{pipeline_days, CountSummary};
use cellar_core::{
    CountryBreakdown, DateWindow, LabelMap, LabelMaps, NoticeRecord, NoticeTypeCode, QueryBuilder,
    QueryProfile, Reconciler, RestCount, ResultTable, SparqlQuery, Vocabulary,
};
use chrono::NaiveDate;
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::BTreeSet;

const SAMPLE: &str = r#"
@prefix epo: <http://data.europa.eu/a4g/ontology#> .
@prefix cccev: <http://data.europa.eu/m8g/> .
@prefix cdm: <http://publications.europa.eu/ontology/cdm#> .
@prefix cmr: <http://publications.europa.eu/ontology/cdm/cmr#> .
@prefix dc: <http://purl.org/dc/elements/1.1/> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix nt: <http://publications.europa.eu/resource/authority/notice-type/> .
@prefix ft: <http://publications.europa.eu/resource/authority/form-type/> .
@prefix pt: <http://publications.europa.eu/resource/authority/procurement-procedure-type/> .
@prefix country: <http://publications.europa.eu/resource/authority/country/> .
@prefix ex: <http://example.org/> .

nt:cn-standard a skos:Concept ;
    skos:topConceptOf <http://publications.europa.eu/resource/authority/notice-type> ;
    skos:prefLabel "Contract notice"@en, "Avis de marché"@fr .
nt:can-standard a skos:Concept ;
    skos:topConceptOf <http://publications.europa.eu/resource/authority/notice-type> ;
    skos:prefLabel "Contract award notice"@en .
ft:competition a skos:Concept ;
    skos:topConceptOf <http://publications.europa.eu/resource/authority/form-type> ;
    skos:prefLabel "Competition"@en .
ft:result a skos:Concept ;
    skos:topConceptOf <http://publications.europa.eu/resource/authority/form-type> ;
    skos:prefLabel "Result"@en .
pt:open a skos:Concept ;
    skos:prefLabel "Open"@en, "Offen"@de .
country:AUT dc:identifier "AUT" .

ex:graph1 {
    ex:n1 a epo:Notice ;
        epo:hasPublicationDate "2025-05-22"^^xsd:date ;
        epo:hasNoticePublicationNumber "00320001-2025" ;
        epo:hasNoticeType nt:cn-standard ;
        epo:hasFormType ft:competition .
    ex:n2 a epo:Notice ;
        epo:hasPublicationDate "2025-05-23"^^xsd:date ;
        epo:hasNoticePublicationNumber "00330001-2025" ;
        epo:hasNoticeType nt:cn-standard ;
        epo:hasFormType ft:competition ;
        epo:refersToProcedure [ a epo:Procedure ; epo:hasProcedureType pt:open ] ;
        epo:announcesRole [
            a epo:Buyer ;
            epo:playedBy [
                epo:hasLegalName "Stadt Wien" ;
                cccev:registeredAddress [ epo:hasCountryCode country:AUT ]
            ]
        ] .
    ex:n3 a epo:Notice ;
        epo:hasPublicationDate "2025-05-23"^^xsd:date ;
        epo:hasNoticePublicationNumber "00330002-2025" ;
        epo:hasNoticeType nt:can-standard ;
        epo:hasFormType ft:result .
    ex:n4 a epo:Notice ;
        epo:hasPublicationDate "2025-05-24"^^xsd:date ;
        epo:hasNoticePublicationNumber "00340001-2025" ;
        epo:hasNoticeType nt:can-standard ;
        epo:hasFormType ft:result .
    ex:n5 a epo:Notice ;
        epo:hasPublicationDate "2025-05-23" ;
        epo:hasNoticePublicationNumber "00330099-2025" ;
        epo:hasNoticeType nt:cn-standard ;
        epo:hasFormType ft:competition .
}

ex:graph2 {
    ex:n2 a epo:Notice ;
        epo:hasPublicationDate "2025-05-23"^^xsd:date ;
        epo:hasNoticePublicationNumber "00330001-2025" ;
        epo:hasNoticeType nt:cn-standard ;
        epo:hasFormType ft:competition .
}

ex:mets1 {
    ex:d1 a cdm:procurement_public ;
        cdm:procurement_public_number_document_in_official-journal "330001-2025" ;
        cdm:work_date_document "2025-05-23"^^xsd:date ;
        cmr:lastModificationDate "2025-05-23T06:10:00Z"^^xsd:dateTime .
    ex:d2 a cdm:procurement_public ;
        cdm:procurement_public_number_document_in_official-journal "320001-2025" ;
        cdm:work_date_document "2025-05-22"^^xsd:date ;
        cmr:lastModificationDate "2025-05-23T23:59:59Z"^^xsd:dateTime .
    ex:d3 a cdm:procurement_public ;
        cdm:procurement_public_number_document_in_official-journal "340001-2025" ;
        cdm:work_date_document "2025-05-24"^^xsd:date ;
        cmr:lastModificationDate "2025-05-24T00:00:00Z"^^xsd:dateTime .
    ex:d4 a cdm:procurement_public ;
        cdm:procurement_public_number_document_in_official-journal "350001-2025" ;
        cdm:work_date_document "2025-05-25"^^xsd:date ;
        cmr:lastModificationDate "2025-05-25T12:00:00"^^xsd:dateTime .
}
"#;

fn store() -> Store {
    let store = Store::new().unwrap();
    store
        .load_from_reader(RdfFormat::TriG, SAMPLE.as_bytes())
        .unwrap();
    store
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
}

fn codes(values: &[&str]) -> BTreeSet<NoticeTypeCode> {
    values.iter().map(|v| NoticeTypeCode::new(*v).unwrap()).collect()
}

/// Run `query` and unwrap terms to plain values, as the HTTP client does.
fn execute(store: &Store, query: &SparqlQuery) -> Vec<NoticeRecord> {
    let QueryResults::Solutions(solutions) = store.query(query.as_str()).unwrap() else {
        panic!("expected SELECT solutions");
    };
    solutions
        .map(|solution| {
            let solution = solution.unwrap();
            solution
                .iter()
                .map(|(var, term)| {
                    let value = match term {
                        Term::NamedNode(node) => node.as_str().to_string(),
                        Term::Literal(literal) => literal.value().to_string(),
                        other => other.to_string(),
                    };
                    (var.as_str().to_string(), value)
                })
                .collect::<NoticeRecord>()
        })
        .collect()
}

fn publication_numbers(rows: &[NoticeRecord]) -> Vec<&str> {
    let mut numbers: Vec<&str> = rows.iter().filter_map(|r| r.get("publicationNumber")).collect();
    numbers.sort();
    numbers
}

fn labels(store: &Store, vocabulary: Vocabulary) -> LabelMap {
    let query = SparqlQuery::vocabulary_labels(vocabulary, "en").unwrap();
    let rows = execute(store, &query);
    let table = ResultTable::new(
        vec![vocabulary.uri_variable().to_string(), "label".to_string()],
        rows,
    );
    LabelMap::from_table(vocabulary, &table, "memory").unwrap()
}

/// Test: a single-day typed filter matches exactly that day, once per notice
#[test]
fn test_single_day_matches_typed_dates_only() {
    let store = store();
    let query =
        QueryBuilder::build(QueryProfile::DailyNotices, &DateWindow::single_day(date(23)), &BTreeSet::new())
            .unwrap();

    let rows = execute(&store, &query);

    // n2 appears in two graphs; n5 carries an untyped date
    assert_eq!(publication_numbers(&rows), vec!["00330001-2025", "00330002-2025"]);
}

#[test]
fn test_range_is_inclusive() {
    let store = store();
    let window = DateWindow::new(date(22), date(23)).unwrap();
    let query = QueryBuilder::build(QueryProfile::DailyNotices, &window, &BTreeSet::new()).unwrap();

    let rows = execute(&store, &query);
    assert_eq!(
        publication_numbers(&rows),
        vec!["00320001-2025", "00330001-2025", "00330002-2025"]
    );
}

#[test]
fn test_type_filter_restricts_rows() {
    let store = store();
    let window = DateWindow::new(date(22), date(24)).unwrap();

    let unfiltered = QueryBuilder::build(QueryProfile::DailyNotices, &window, &BTreeSet::new()).unwrap();
    let filtered =
        QueryBuilder::build(QueryProfile::DailyNotices, &window, &codes(&["can-standard"])).unwrap();
    let both = QueryBuilder::build(
        QueryProfile::DailyNotices,
        &window,
        &codes(&["can-standard", "cn-standard"]),
    )
    .unwrap();

    assert_eq!(execute(&store, &unfiltered).len(), 4);
    assert_eq!(
        publication_numbers(&execute(&store, &filtered)),
        vec!["00330002-2025", "00340001-2025"]
    );
    assert_eq!(execute(&store, &both).len(), 4);
}

#[test]
fn test_counts_by_date_group_distinct_notices() {
    let store = store();
    let window = DateWindow::new(date(22), date(24)).unwrap();
    let query = QueryBuilder::build(QueryProfile::NoticeCountsByDate, &window, &BTreeSet::new()).unwrap();

    let rows = execute(&store, &query);
    let summary = CountSummary::from_rows(&rows, &labels(&store, Vocabulary::NoticeType)).unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.by_date.get(&date(22)), Some(&1));
    assert_eq!(summary.by_date.get(&date(23)), Some(&2));
    assert_eq!(summary.by_date.get(&date(24)), Some(&1));
    assert_eq!(summary.by_type.get("Contract notice"), Some(&2));
    assert_eq!(summary.by_type.get("Contract award notice"), Some(&2));
    assert!(summary.unknown_labels.is_empty());
}

/// Test: upload activity groups and filters on the stored upload day
#[test]
fn test_pipeline_activity_single_upload_day() {
    let store = store();
    let query = QueryBuilder::build(
        QueryProfile::PipelineActivity,
        &DateWindow::single_day(date(23)),
        &BTreeSet::new(),
    )
    .unwrap();

    let days = pipeline_days(&execute(&store, &query)).unwrap();

    assert_eq!(days.len(), 1);
    assert_eq!(days[0].date_updated, date(23));
    assert_eq!(days[0].document_count, 2);
    assert_eq!(days[0].min_publication_date, date(22));
    assert_eq!(days[0].max_publication_date, date(23));
}

/// Test: timestamps stored without a timezone are still counted
#[test]
fn test_pipeline_activity_timestamp_without_timezone() {
    let store = store();
    let single = QueryBuilder::build(
        QueryProfile::PipelineActivity,
        &DateWindow::single_day(date(25)),
        &BTreeSet::new(),
    )
    .unwrap();

    let days = pipeline_days(&execute(&store, &single)).unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].date_updated, date(25));
    assert_eq!(days[0].document_count, 1);

    let range = QueryBuilder::build(
        QueryProfile::PipelineActivity,
        &DateWindow::new(date(23), date(25)).unwrap(),
        &BTreeSet::new(),
    )
    .unwrap();
    let days = pipeline_days(&execute(&store, &range)).unwrap();
    let uploads: Vec<(NaiveDate, u64)> =
        days.iter().map(|d| (d.date_updated, d.document_count)).collect();
    assert_eq!(uploads, vec![(date(23), 2), (date(24), 1), (date(25), 1)]);
}

#[test]
fn test_competition_notices_with_english_procedure_type() {
    let store = store();
    let query = QueryBuilder::build(
        QueryProfile::CompetitionNotices,
        &DateWindow::single_day(date(23)),
        &BTreeSet::new(),
    )
    .unwrap();

    let rows = execute(&store, &query);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("legalName"), Some("Stadt Wien"));
    assert_eq!(rows[0].get("procedureType"), Some("Open"));
    assert_eq!(rows[0].get("country"), Some("AUT"));
    assert_eq!(CountryBreakdown::from_rows(&rows, "country").get("AUT"), Some(1));
}

#[test]
fn test_vocabulary_labels_respect_language() {
    let store = store();
    let notice_types = labels(&store, Vocabulary::NoticeType);
    assert_eq!(notice_types.len(), 2);
    assert_eq!(
        notice_types.get("http://publications.europa.eu/resource/authority/notice-type/cn-standard"),
        Some("Contract notice")
    );
    assert_eq!(labels(&store, Vocabulary::FormType).len(), 2);
}

/// Test: executed rows reconcile against executed label queries
#[test]
fn test_executed_rows_reconcile() {
    let store = store();
    let query =
        QueryBuilder::build(QueryProfile::DailyNotices, &DateWindow::single_day(date(23)), &BTreeSet::new())
            .unwrap();
    let rows = execute(&store, &query);
    let notice_types = labels(&store, Vocabulary::NoticeType);
    let form_types = labels(&store, Vocabulary::FormType);

    let result = Reconciler::reconcile(
        &rows,
        LabelMaps::new(&notice_types, &form_types),
        RestCount::Counted(2),
        RestCount::Counted(2),
    );

    assert_eq!(result.graph_count, 2);
    assert_eq!(result.breakdown_by_type.get("Contract notice"), Some(&1));
    assert_eq!(result.breakdown_by_type.get("Contract award notice"), Some(&1));
    assert_eq!(result.breakdown_by_form.get("Result"), Some(&1));
    assert!(result.unknown_labels.is_empty());
    assert!(result.is_consistent());
}
