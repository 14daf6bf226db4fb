//! # Report Periods
//!
//! Calendar date ranges used to slice earnings and redemptions.
//!
//! ## Whole-Day Boundaries
//! ```text
//! DateRange { start: 2026-03-01, end: 2026-03-31 }
//!
//!   starts_at() = 2026-03-01T00:00:00Z      (inclusive)
//!   ends_before() = 2026-04-01T00:00:00Z    (exclusive)
//!
//!   2026-03-31T23:59:59.999Z  ✓ included
//!   2026-04-01T00:00:00Z      ✗ excluded
//! ```
//!
//! A missing bound is unbounded. [`DateRange::all_time`] has neither and is
//! the range redemption authorization always uses.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        Self::from_bounds(Some(start), Some(end))
    }

    /// Creates a range where either side may be open.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ValidationResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ValidationError::InvalidDateRange {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }
        Ok(DateRange { start, end })
    }

    /// Every order and redemption ever recorded.
    pub const fn all_time() -> Self {
        DateRange {
            start: None,
            end: None,
        }
    }

    pub const fn is_all_time(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// First instant inside the range.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// First instant after the range (midnight following `end`).
    pub fn ends_before(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Whether an instant falls inside the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.starts_at().map_or(true, |s| at >= s);
        let before_end = self.ends_before().map_or(true, |e| at < e);
        after_start && before_end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = DateRange::new(date(2026, 3, 2), date(2026, 3, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_single_day_range_is_valid() {
        let range = DateRange::new(date(2026, 3, 1), date(2026, 3, 1)).unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn test_end_day_is_inclusive_next_day_is_not() {
        let range = DateRange::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();

        let last_instant = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        let end_boundary = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();

        assert!(range.contains(end_boundary));
        assert!(range.contains(last_instant));
        assert!(!range.contains(next_day));
    }

    #[test]
    fn test_start_day_is_inclusive() {
        let range = DateRange::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_all_time_contains_everything() {
        let range = DateRange::all_time();
        assert!(range.is_all_time());
        assert!(range.starts_at().is_none());
        assert!(range.ends_before().is_none());
        assert!(range.contains(Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange::from_bounds(Some(date(2026, 1, 1)), None).unwrap();
        assert!(!range.contains(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }
}
