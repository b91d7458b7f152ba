//! Request bodies for the TED notice search API (`POST /v3/notices/search`)
//!
//! The API takes an "expert query" string. Dates are written `YYYYMMDD` and
//! conditions are joined with lowercase `and` / `or`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::NoticeTypeCode;

pub const DEFAULT_SCOPE: &str = "ALL";
pub const DEFAULT_FIELDS: [&str; 2] = ["publication-date", "notice-type"];

/// JSON body of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TedSearchQuery {
    pub query: String,
    pub scope: String,
    pub fields: Vec<String>,
}

impl TedSearchQuery {
    /// Notices published on `date`, optionally restricted to `types`.
    ///
    /// # Example
    ///
    /// ```
    /// use cellar_core::TedSearchQuery;
    /// use chrono::NaiveDate;
    /// use std::collections::BTreeSet;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 5, 23).unwrap();
    /// let body = TedSearchQuery::for_day(date, &BTreeSet::new());
    /// assert_eq!(body.query, "publication-date = 20250523");
    /// ```
    pub fn for_day(date: NaiveDate, types: &BTreeSet<NoticeTypeCode>) -> Self {
        let mut conditions = vec![format!("publication-date = {}", date.format("%Y%m%d"))];

        if !types.is_empty() {
            let alternatives: Vec<String> = types
                .iter()
                .map(|code| format!("notice-type = {}", code))
                .collect();
            conditions.push(format!("({})", alternatives.join(" or ")));
        }

        Self {
            query: conditions.join(" and "),
            scope: DEFAULT_SCOPE.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}
