//! Competition notices dashboard
//!
//! Calls for competition published on one day, with the buyer's legal name
//! and country, grouped per country for the map view.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, instrument};

use super::Dashboard;
use crate::country::CountryBreakdown;
use crate::errors::Result;
use crate::fetch::NoticeRecord;
use crate::query::{QueryBuilder, QueryProfile, SparqlQuery};
use crate::reconcile::ted_notice_url;
use crate::window::DateWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionNotice {
    pub publication_number: Option<String>,
    pub legal_name: Option<String>,
    pub procedure_type: Option<String>,
    /// ISO 3166 alpha-3 code of the buyer.
    pub country: Option<String>,
    pub url: Option<String>,
}

impl CompetitionNotice {
    pub fn from_row(row: &NoticeRecord) -> Self {
        let field = |name: &str| row.get(name).map(str::to_string);
        let publication_number = field("publicationNumber");
        Self {
            url: publication_number.as_deref().map(ted_notice_url),
            publication_number,
            legal_name: field("legalName"),
            procedure_type: field("procedureType"),
            country: field("country"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionReport {
    pub date: NaiveDate,
    pub query: SparqlQuery,
    pub notices: Vec<CompetitionNotice>,
    pub countries: CountryBreakdown,
}

impl Dashboard {
    #[instrument(skip(self))]
    pub async fn competition(&self, date: NaiveDate) -> Result<CompetitionReport> {
        let window = DateWindow::single_day(date);
        let query =
            QueryBuilder::build(QueryProfile::CompetitionNotices, &window, &BTreeSet::new())?;

        let table = self.sparql.select(&query).await?;
        let countries = CountryBreakdown::from_rows(table.rows(), "country");
        let notices: Vec<CompetitionNotice> =
            table.rows().iter().map(CompetitionNotice::from_row).collect();

        info!(
            notices = notices.len(),
            countries = countries.countries.len(),
            unmapped = countries.unmapped_total(),
            "competition run complete"
        );

        Ok(CompetitionReport {
            date,
            query,
            notices,
            countries,
        })
    }
}
