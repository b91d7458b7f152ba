//! Date selections for dashboard runs
//!
//! A [`DateWindow`] is the only way a calendar selection reaches the query
//! layer. It is inclusive on both ends and can never be inverted.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CellarError, Result};

/// Length of the default period selection, in days.
pub const DEFAULT_PERIOD_DAYS: u64 = 90;

/// Inclusive calendar window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`.
    ///
    /// # Example
    ///
    /// ```
    /// use cellar_core::DateWindow;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
    /// assert!(DateWindow::new(start, end).is_ok());
    /// assert!(DateWindow::new(end, start).is_err());
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CellarError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Parse two ISO-8601 calendar dates (`YYYY-MM-DD`).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Parse an ISO-8601 calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CellarError::InvalidDate(format!("{:?}: {}", value, e)))
}

/// Default day for the daily dashboards.
///
/// Yesterday, except on Sunday where Saturday has no publications and the
/// Friday before is used instead.
pub fn default_daily_date(today: NaiveDate) -> NaiveDate {
    let back = if today.weekday() == Weekday::Sun { 2 } else { 1 };
    today.checked_sub_days(Days::new(back)).unwrap_or(today)
}

/// Default window for the period dashboard: from 90 days ago through today.
pub fn default_period(today: NaiveDate) -> DateWindow {
    let start = today
        .checked_sub_days(Days::new(DEFAULT_PERIOD_DAYS))
        .unwrap_or(today);
    DateWindow { start, end: today }
}
