/**
 * sparql.rs
 * Query profiles and builders for the Cellar SPARQL endpoint
 *
 * Dates are always rendered as typed literals. Comparing a typed
 * `xsd:date` value with a plain string literal is not an error in SPARQL,
 * it just never matches, so untyped dates are never emitted.
 */

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{NoticeTypeCode, Vocabulary};
use crate::errors::{CellarError, Result};
use crate::window::DateWindow;

const PREFIX_EPO: &str = "PREFIX epo: <http://data.europa.eu/a4g/ontology#>";
const PREFIX_XSD: &str = "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>";
const PREFIX_SKOS: &str = "PREFIX skos: <http://www.w3.org/2004/02/skos/core#>";
const PREFIX_CDM: &str = "PREFIX cdm: <http://publications.europa.eu/ontology/cdm#>";
const PREFIX_CMR: &str = "PREFIX cmr: <http://publications.europa.eu/ontology/cdm/cmr#>";
const PREFIX_CCCEV: &str = "PREFIX cccev: <http://data.europa.eu/m8g/>";
const PREFIX_DC: &str = "PREFIX dc: <http://purl.org/dc/elements/1.1/>";

/// Form type of calls for competition.
pub const COMPETITION_FORM_TYPE: &str =
    "http://publications.europa.eu/resource/authority/form-type/competition";

static LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}$").expect("static regex"));

/// Lowercase ISO 639 code accepted for `skos:prefLabel` filtering.
pub fn is_language_tag(language: &str) -> bool {
    LANGUAGE_TAG.is_match(language)
}

/// SPARQL query text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Wrap query text after checking that it parses as SPARQL 1.1.
    pub fn parse_checked(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        oxigraph::sparql::Query::parse(&query, None)
            .map_err(|e| CellarError::QuerySyntax(e.to_string()))?;
        Ok(Self { query })
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn into_string(self) -> String {
        self.query
    }

    /// List the top concepts of an authority table with their preferred
    /// label in `language`.
    pub fn vocabulary_labels(vocabulary: Vocabulary, language: &str) -> Result<Self> {
        if !is_language_tag(language) {
            return Err(CellarError::Config(format!(
                "label language must be a lowercase ISO 639 code, got {:?}",
                language
            )));
        }
        let var = vocabulary.uri_variable();
        Self::parse_checked(format!(
            r#"{PREFIX_SKOS}

SELECT ?{var} ?label
WHERE {{
  ?{var} a skos:Concept ;
      skos:topConceptOf <{scheme}> ;
      skos:prefLabel ?label .
  FILTER (lang(?label) = "{language}")
}}
"#,
            scheme = vocabulary.scheme_uri(),
        ))
    }
}

impl fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

/// The query shapes used by the dashboards.
///
/// A profile fixes the projected variables, the graph pattern, the date
/// property the window applies to and, when it has one, the variable a
/// notice-type filter restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryProfile {
    /// Notices published in the window with their notice and form type.
    DailyNotices,
    /// Notice counts per publication date and notice type.
    NoticeCountsByDate,
    /// Cellar upload activity per upload day.
    PipelineActivity,
    /// Calls for competition with buyer name, procedure type and country.
    CompetitionNotices,
}

impl QueryProfile {
    pub const ALL: [QueryProfile; 4] = [
        QueryProfile::DailyNotices,
        QueryProfile::NoticeCountsByDate,
        QueryProfile::PipelineActivity,
        QueryProfile::CompetitionNotices,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QueryProfile::DailyNotices => "daily-notices",
            QueryProfile::NoticeCountsByDate => "notice-counts-by-date",
            QueryProfile::PipelineActivity => "pipeline-activity",
            QueryProfile::CompetitionNotices => "competition-notices",
        }
    }

    /// Projected variables, in SELECT order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            QueryProfile::DailyNotices => &["publicationNumber", "noticeTypeUri", "formTypeUri"],
            QueryProfile::NoticeCountsByDate => {
                &["publicationDate", "noticeTypeUri", "documentCount"]
            }
            QueryProfile::PipelineActivity => &[
                "dateUpdated",
                "minPublicationDate",
                "maxPublicationDate",
                "documentCount",
            ],
            QueryProfile::CompetitionNotices => {
                &["publicationNumber", "legalName", "procedureType", "country"]
            }
        }
    }

    /// Variable a notice-type filter applies to, if the profile has one.
    pub fn type_variable(&self) -> Option<&'static str> {
        match self {
            QueryProfile::DailyNotices | QueryProfile::NoticeCountsByDate => {
                Some(Vocabulary::NoticeType.uri_variable())
            }
            QueryProfile::PipelineActivity | QueryProfile::CompetitionNotices => None,
        }
    }

    /// The `xsd:date` variable the window applies to.
    ///
    /// Upload activity is filtered on `?dateUpdated`, the date prefix of the
    /// stored `cmr:lastModificationDate` text, so the day a row is grouped
    /// under is the day it is filtered on. Comparing the raw timestamp with
    /// `Z` bounds is indeterminate for values stored without a timezone.
    fn date_variable(&self) -> &'static str {
        match self {
            QueryProfile::PipelineActivity => "dateUpdated",
            _ => "publicationDate",
        }
    }

    fn render(&self, date_filter: &str, type_filter: &str) -> String {
        match self {
            QueryProfile::DailyNotices => format!(
                r#"{PREFIX_EPO}
{PREFIX_XSD}

SELECT DISTINCT ?publicationNumber ?noticeTypeUri ?formTypeUri
WHERE {{
  GRAPH ?g {{
    ?notice a epo:Notice ;
            epo:hasPublicationDate ?publicationDate ;
            epo:hasNoticePublicationNumber ?publicationNumber ;
            epo:hasNoticeType ?noticeTypeUri ;
            epo:hasFormType ?formTypeUri .
  }}
  {date_filter}{type_filter}
}}
"#
            ),
            QueryProfile::NoticeCountsByDate => format!(
                r#"{PREFIX_EPO}
{PREFIX_XSD}

SELECT ?publicationDate ?noticeTypeUri (COUNT(DISTINCT ?notice) AS ?documentCount)
WHERE {{
  GRAPH ?g {{
    ?notice a epo:Notice ;
            epo:hasPublicationDate ?publicationDate ;
            epo:hasNoticePublicationNumber ?publicationNumber ;
            epo:hasNoticeType ?noticeTypeUri .
  }}
  {date_filter}{type_filter}
}}
GROUP BY ?publicationDate ?noticeTypeUri
ORDER BY ?publicationDate ?noticeTypeUri
"#
            ),
            QueryProfile::PipelineActivity => format!(
                r#"{PREFIX_XSD}
{PREFIX_CDM}
{PREFIX_CMR}

SELECT ?dateUpdated
       (MIN(?date) AS ?minPublicationDate)
       (MAX(?date) AS ?maxPublicationDate)
       (COUNT(?s) AS ?documentCount)
WHERE {{
  GRAPH ?metsNamedGraph {{
    ?s a cdm:procurement_public ;
       cdm:procurement_public_number_document_in_official-journal ?journalNumber ;
       cdm:work_date_document ?date ;
       cmr:lastModificationDate ?cellarLastUpdated .
    BIND(STRDT(SUBSTR(STR(?cellarLastUpdated), 1, 10), xsd:date) AS ?dateUpdated)
  }}
  {date_filter}{type_filter}
}}
GROUP BY ?dateUpdated
ORDER BY ?dateUpdated
"#
            ),
            QueryProfile::CompetitionNotices => format!(
                r#"{PREFIX_CCCEV}
{PREFIX_DC}
{PREFIX_EPO}
{PREFIX_SKOS}
{PREFIX_XSD}

SELECT DISTINCT ?publicationNumber ?legalName ?procedureType ?country
WHERE {{
  GRAPH ?g {{
    ?notice epo:hasPublicationDate ?publicationDate ;
            epo:refersToProcedure [
              a epo:Procedure ;
              epo:hasProcedureType ?procedureTypeUri
            ] ;
            epo:hasNoticePublicationNumber ?publicationNumber ;
            epo:hasFormType <{COMPETITION_FORM_TYPE}> ;
            epo:announcesRole [
              a epo:Buyer ;
              epo:playedBy [
                epo:hasLegalName ?legalName ;
                cccev:registeredAddress [
                  epo:hasCountryCode ?countryUri
                ]
              ]
            ] .
  }}
  ?procedureTypeUri a skos:Concept ;
      skos:prefLabel ?procedureType .
  FILTER (lang(?procedureType) = "en")
  ?countryUri dc:identifier ?country .
  {date_filter}{type_filter}
}}
"#
            ),
        }
    }
}

impl fmt::Display for QueryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryProfile {
    type Err = CellarError;

    fn from_str(s: &str) -> Result<Self> {
        QueryProfile::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| CellarError::Config(format!("unknown query profile {:?}", s)))
    }
}

/// Turns a date selection and a notice-type filter into SPARQL text.
///
/// Building is pure: the same profile, window and filter set always give
/// byte-identical text. Filters are held in a `BTreeSet`, so their order in
/// the disjunction is the codes' lexicographic order.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build a validated query for `window`.
    ///
    /// An empty `filters` set means no restriction: the type clause is left
    /// out, not rendered as an always-false disjunction.
    ///
    /// # Example
    ///
    /// ```
    /// use cellar_core::{DateWindow, QueryBuilder, QueryProfile};
    /// use chrono::NaiveDate;
    /// use std::collections::BTreeSet;
    ///
    /// let day = DateWindow::single_day(NaiveDate::from_ymd_opt(2025, 5, 23).unwrap());
    /// let query = QueryBuilder::build(QueryProfile::DailyNotices, &day, &BTreeSet::new()).unwrap();
    /// assert!(query.as_str().contains(r#""2025-05-23"^^xsd:date"#));
    /// ```
    pub fn build(
        profile: QueryProfile,
        window: &DateWindow,
        filters: &BTreeSet<NoticeTypeCode>,
    ) -> Result<SparqlQuery> {
        let type_filter = match (profile.type_variable(), filters.is_empty()) {
            (_, true) => String::new(),
            (Some(var), false) => format!("\n  {}", type_filter(var, filters)),
            (None, false) => {
                return Err(CellarError::UnsupportedFilter {
                    profile: profile.name().to_string(),
                })
            }
        };
        let date_filter = date_filter(profile.date_variable(), window);

        SparqlQuery::parse_checked(profile.render(&date_filter, &type_filter))
    }

    /// Build from raw bounds, rejecting `start > end` before anything else.
    pub fn build_between(
        profile: QueryProfile,
        start: NaiveDate,
        end: NaiveDate,
        filters: &BTreeSet<NoticeTypeCode>,
    ) -> Result<SparqlQuery> {
        let window = DateWindow::new(start, end)?;
        Self::build(profile, &window, filters)
    }
}

/// `"2025-05-23"^^xsd:date`
pub fn date_literal(date: NaiveDate) -> String {
    format!("\"{}\"^^xsd:date", date.format("%Y-%m-%d"))
}

fn date_filter(var: &str, window: &DateWindow) -> String {
    if window.is_single_day() {
        format!("FILTER (?{var} = {})", date_literal(window.start()))
    } else {
        format!(
            "FILTER (?{var} >= {} && ?{var} <= {})",
            date_literal(window.start()),
            date_literal(window.end())
        )
    }
}

fn type_filter(var: &str, filters: &BTreeSet<NoticeTypeCode>) -> String {
    let alternatives: Vec<String> = filters
        .iter()
        .map(|code| format!("?{var} = <{}>", code.uri()))
        .collect();
    format!("FILTER ({})", alternatives.join(" || "))
}
