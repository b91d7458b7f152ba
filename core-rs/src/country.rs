//! ISO 3166 country codes for the competition dashboard
//!
//! Buyer addresses in Cellar carry alpha-3 codes (`AUT`), while world map
//! topologies are keyed by ISO numeric ids (`040`). The table covers the
//! European countries that publish on TED.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::fetch::NoticeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub alpha3: &'static str,
    pub numeric: u16,
    pub name: &'static str,
}

impl Country {
    /// Numeric code zero-padded to three digits, as used by map ids.
    pub fn numeric_code(&self) -> String {
        format!("{:03}", self.numeric)
    }
}

const fn country(alpha3: &'static str, numeric: u16, name: &'static str) -> Country {
    Country {
        alpha3,
        numeric,
        name,
    }
}

static COUNTRIES: [Country; 37] = [
    country("ALB", 8, "Albania"),
    country("AUT", 40, "Austria"),
    country("BEL", 56, "Belgium"),
    country("BIH", 70, "Bosnia and Herzegovina"),
    country("BGR", 100, "Bulgaria"),
    country("HRV", 191, "Croatia"),
    country("CYP", 196, "Cyprus"),
    country("CZE", 203, "Czech Republic"),
    country("DNK", 208, "Denmark"),
    country("EST", 233, "Estonia"),
    country("FIN", 246, "Finland"),
    country("FRA", 250, "France"),
    country("DEU", 276, "Germany"),
    country("GRC", 300, "Greece"),
    country("HUN", 348, "Hungary"),
    country("ISL", 352, "Iceland"),
    country("IRL", 372, "Ireland"),
    country("ITA", 380, "Italy"),
    country("LVA", 428, "Latvia"),
    country("LIE", 438, "Liechtenstein"),
    country("LTU", 440, "Lithuania"),
    country("LUX", 442, "Luxembourg"),
    country("MLT", 470, "Malta"),
    country("MNE", 499, "Montenegro"),
    country("NLD", 528, "Netherlands"),
    country("NOR", 578, "Norway"),
    country("POL", 616, "Poland"),
    country("PRT", 620, "Portugal"),
    country("ROU", 642, "Romania"),
    country("SRB", 688, "Serbia"),
    country("SVK", 703, "Slovakia"),
    country("SVN", 705, "Slovenia"),
    country("ESP", 724, "Spain"),
    country("SWE", 752, "Sweden"),
    country("CHE", 756, "Switzerland"),
    country("MKD", 807, "North Macedonia"),
    country("GBR", 826, "United Kingdom"),
];

/// Static bidirectional alpha-3 ↔ numeric table.
pub struct CountryCodeMap;

impl CountryCodeMap {
    pub fn all() -> &'static [Country] {
        &COUNTRIES
    }

    pub fn by_alpha3(alpha3: &str) -> Option<&'static Country> {
        COUNTRIES.iter().find(|c| c.alpha3 == alpha3)
    }

    pub fn by_numeric(numeric: u16) -> Option<&'static Country> {
        COUNTRIES.iter().find(|c| c.numeric == numeric)
    }

    pub fn numeric(alpha3: &str) -> Option<u16> {
        Self::by_alpha3(alpha3).map(|c| c.numeric)
    }

    pub fn alpha3(numeric: u16) -> Option<&'static str> {
        Self::by_numeric(numeric).map(|c| c.alpha3)
    }

    pub fn name(alpha3: &str) -> Option<&'static str> {
        Self::by_alpha3(alpha3).map(|c| c.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    /// Zero-padded ISO numeric code.
    pub id: String,
    /// ISO numeric code as an integer, the id type of world-110m features.
    pub numeric: u16,
    pub alpha3: String,
    pub name: String,
    pub count: u64,
}

/// Notices per buyer country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryBreakdown {
    /// Mapped countries, ordered by numeric code.
    pub countries: Vec<CountryCount>,
    /// Codes with no entry in [`CountryCodeMap`], with their row counts.
    pub unmapped: BTreeMap<String, u64>,
    /// Rows that did not bind the country field.
    pub missing: u64,
}

impl CountryBreakdown {
    pub fn from_rows(rows: &[NoticeRecord], field: &str) -> Self {
        let mut mapped: BTreeMap<u16, u64> = BTreeMap::new();
        let mut breakdown = Self::default();

        for row in rows {
            match row.get(field) {
                Some(code) => match CountryCodeMap::numeric(code) {
                    Some(numeric) => *mapped.entry(numeric).or_default() += 1,
                    None => *breakdown.unmapped.entry(code.to_string()).or_default() += 1,
                },
                None => breakdown.missing += 1,
            }
        }

        breakdown.countries = mapped
            .into_iter()
            .filter_map(|(numeric, count)| {
                CountryCodeMap::by_numeric(numeric).map(|c| CountryCount {
                    id: c.numeric_code(),
                    numeric: c.numeric,
                    alpha3: c.alpha3.to_string(),
                    name: c.name.to_string(),
                    count,
                })
            })
            .collect();
        breakdown
    }

    pub fn mapped_total(&self) -> u64 {
        self.countries.iter().map(|c| c.count).sum()
    }

    pub fn unmapped_total(&self) -> u64 {
        self.unmapped.values().sum()
    }

    pub fn get(&self, alpha3: &str) -> Option<u64> {
        self.countries
            .iter()
            .find(|c| c.alpha3 == alpha3)
            .map(|c| c.count)
    }
}
