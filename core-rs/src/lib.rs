//! # Cellar Core - notice statistics over the EU Publications Office graph
//!
//! Builds SPARQL queries for procurement notices published on a day or over
//! a period, executes them against the Cellar SPARQL endpoint, cross-checks
//! the counts against the TED search API and reconciles both into report
//! values for a renderer.
//!
//! ## Data Flow
//!
//! ```text
//!   DateWindow + notice-type filter
//!               │
//!         QueryBuilder ──────────────┐
//!               │                    │
//!       SparqlClient (graph)   TedClient (REST)
//!               │                    │
//!               └──── Reconciler ────┘
//!                         │
//!                    report values
//! ```
//!
//! Vocabulary labels (notice types, form types) are fetched once per
//! process and kept in a [`LabelCache`].

pub mod errors;
pub mod window;
pub mod query;
pub mod fetch;
pub mod cache;
pub mod reconcile;
pub mod country;
pub mod dashboard;
pub mod config;
pub mod logging;

pub use errors::{CellarError, FetchError, Result};
pub use window::{default_daily_date, default_period, DateWindow};
pub use query::{NoticeTypeCode, QueryBuilder, QueryProfile, SparqlQuery, TedSearchQuery, Vocabulary};
pub use fetch::{EndpointConfig, NoticeRecord, ResultTable, RetryPolicy, SparqlClient, TedClient};
pub use cache::{LabelCache, LabelMap, UNKNOWN_LABEL};
pub use reconcile::{LabelMaps, LabeledNotice, Reconciler, ReconciliationResult, RestCount, UnknownLabel};
pub use country::{Country, CountryBreakdown, CountryCodeMap};
pub use dashboard::{CompetitionReport, DailyReport, Dashboard, PeriodReport};
pub use config::CellarConfig;

/// Crate version, reported by the CLI and in the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
