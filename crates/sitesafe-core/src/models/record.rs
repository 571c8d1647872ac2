use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::AppError;

/// Storage format for `created_at`: ISO-8601, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Storage format for `date_of_event`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifier assigned by the backing store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// The two record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    PersonnelViolation,
    SiteIssue,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::PersonnelViolation => "personnel_violations",
            RecordKind::SiteIssue => "site_issues",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RecordKind::PersonnelViolation => write!(f, "personnel violation"),
            RecordKind::SiteIssue => write!(f, "site issue"),
        }
    }
}

/// Closed date interval on `date_of_event`; both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days`-day window ending on `end`, inclusive at both boundaries.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        let start = end
            .checked_sub_signed(chrono::Duration::days(days.max(0)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts fractional seconds, which are dropped.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, AppError> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|ts| ts.with_nanosecond(0).unwrap_or(ts))
        .map_err(|e| AppError::Persistence(format!("Malformed created_at '{}': {}", raw, e)))
}

/// Parse a stored event date. Accepts a full timestamp and keeps its date part.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| AppError::Persistence(format!("Malformed date_of_event '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let err = DateRange::new(day(2024, 2, 2), day(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }));
        assert!(DateRange::new(day(2024, 2, 1), day(2024, 2, 1)).is_ok());
    }

    #[test]
    fn range_is_inclusive() {
        let range = DateRange::new(day(2024, 2, 1), day(2024, 2, 29)).unwrap();
        assert!(range.contains(day(2024, 2, 1)));
        assert!(range.contains(day(2024, 2, 29)));
        assert!(!range.contains(day(2024, 3, 1)));
    }

    #[test]
    fn trailing_window_spans_back_from_end() {
        let range = DateRange::trailing(day(2024, 3, 31), 30);
        assert_eq!(range.start(), day(2024, 3, 1));
        assert_eq!(range.end(), day(2024, 3, 31));
    }

    #[test]
    fn timestamps_round_trip_at_second_precision() {
        let parsed = parse_timestamp("2024-06-01T08:30:15.123456").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-06-01T08:30:15");
        let parsed = parse_timestamp("2024-06-01 08:30:15").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-06-01T08:30:15");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn dates_parse_from_date_or_timestamp() {
        assert_eq!(parse_date("2024-06-01").unwrap(), day(2024, 6, 1));
        assert_eq!(parse_date("2024-06-01T10:00:00").unwrap(), day(2024, 6, 1));
        assert!(parse_date("06/01/2024").is_err());
    }
}
