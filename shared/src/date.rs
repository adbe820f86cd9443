//! Report date ranges.
//!
//! The analytics endpoints take `start_date` / `end_date` as `YYYY-MM-DD`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Both start date and end date are required")]
    Missing,
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[today - days, today]`, the dashboard's default window.
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let start = today.checked_sub_days(Days::new(days)).unwrap_or(today);
        Self { start, end: today }
    }

    /// Parse form input. Both ends must be present.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(DateRangeError::Missing);
        }
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    pub fn with_start(self, start: NaiveDate) -> Self {
        Self { start, ..self }
    }

    pub fn with_end(self, end: NaiveDate) -> Self {
        Self { end, ..self }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_date", format_date(self.start)),
            ("end_date", format_date(self.end)),
        ]
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| DateRangeError::Invalid(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_days() {
        let range = DateRange::last_days(day(2024, 3, 3), 7);
        assert_eq!(range.start, day(2024, 2, 25));
        assert_eq!(range.end, day(2024, 3, 3));
        assert_eq!(
            range.query(),
            vec![
                ("start_date", "2024-02-25".to_string()),
                ("end_date", "2024-03-03".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_requires_both() {
        assert_eq!(DateRange::parse("", "2024-01-01"), Err(DateRangeError::Missing));
        assert_eq!(DateRange::parse("2024-01-01", "  "), Err(DateRangeError::Missing));
        assert_eq!(
            DateRange::parse("2024-01-01", "01/02/2024"),
            Err(DateRangeError::Invalid("01/02/2024".into()))
        );
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.end, day(2024, 1, 31));
    }
}
