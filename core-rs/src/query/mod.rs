/**
 * query module
 *
 * - sparql: SPARQL query profiles and the date/filter templating
 * - ted: TED search API request bodies
 *
 * Shared vocabulary: notice-type codes and the authority tables that
 * label them.
 */

pub mod sparql;
pub mod ted;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CellarError, Result};

pub use sparql::{QueryBuilder, QueryProfile, SparqlQuery};
pub use ted::TedSearchQuery;

/// Base IRI of the Publications Office authority tables.
pub const AUTHORITY_BASE: &str = "http://publications.europa.eu/resource/authority";

static NOTICE_TYPE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("static regex"));

/// Short notice-type code such as `cn-standard` or `can-social`.
///
/// Codes are embedded verbatim in IRIs and in TED expert queries, so only
/// letters, digits, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoticeTypeCode(String);

impl NoticeTypeCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if !NOTICE_TYPE_CODE.is_match(&code) {
            return Err(CellarError::InvalidNoticeType(code));
        }
        Ok(Self(code))
    }

    /// Take the last path segment of a notice-type IRI.
    ///
    /// `http://publications.europa.eu/resource/authority/notice-type/cn-standard`
    /// becomes `cn-standard`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let code = uri.rsplit('/').next().unwrap_or(uri);
        Self::new(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn uri(&self) -> String {
        format!("{}/{}", Vocabulary::NoticeType.scheme_uri(), self.0)
    }
}

impl fmt::Display for NoticeTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NoticeTypeCode {
    type Error = CellarError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NoticeTypeCode> for String {
    fn from(code: NoticeTypeCode) -> Self {
        code.0
    }
}

/// Controlled vocabularies that give notice URIs a human label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vocabulary {
    NoticeType,
    FormType,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 2] = [Vocabulary::NoticeType, Vocabulary::FormType];

    /// Concept scheme IRI of the authority table.
    pub fn scheme_uri(&self) -> String {
        format!("{}/{}", AUTHORITY_BASE, self.slug())
    }

    /// Variable bound to the concept IRI, both in label queries and in
    /// notice rows.
    pub fn uri_variable(&self) -> &'static str {
        match self {
            Vocabulary::NoticeType => "noticeTypeUri",
            Vocabulary::FormType => "formTypeUri",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Vocabulary::NoticeType => "notice-type",
            Vocabulary::FormType => "form-type",
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
