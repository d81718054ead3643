//! Business-day boundary resolution.
//!
//! A restaurant's reporting day does not end at midnight: orders rung in
//! during the small hours belong to the previous day's service. This
//! module turns calendar dates plus a configurable boundary time into
//! half-open timestamp intervals, and maps timestamps back to the
//! business day they belong to.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{EngineError, EngineResult};

/// Returns the default business-day boundary time, 02:00:00.
///
/// Orders paid between midnight and this time belong to the previous
/// business day, matching how the venue closes its register.
pub fn default_day_boundary() -> NaiveTime {
    NaiveTime::from_hms_opt(2, 0, 0).expect("02:00:00 is a valid time")
}

/// Resolves a date range into a half-open timestamp interval.
///
/// The interval starts at `boundary` on `earliest` and ends at
/// `boundary` on the day after `latest`, so a single-day range covers
/// one full business day: `resolve_range(d, d, b)` yields
/// `[d b, d+1 b)`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRange`] when `latest < earliest`. The
/// range is rejected before any row fetching takes place.
///
/// # Example
///
/// ```
/// use order_engine::business_day::{default_day_boundary, resolve_range};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
/// let (start, end) = resolve_range(day, day, default_day_boundary()).unwrap();
/// assert_eq!(start.to_string(), "2020-06-01 02:00:00");
/// assert_eq!(end.to_string(), "2020-06-02 02:00:00");
/// ```
pub fn resolve_range(
    earliest: NaiveDate,
    latest: NaiveDate,
    boundary: NaiveTime,
) -> EngineResult<(NaiveDateTime, NaiveDateTime)> {
    if latest < earliest {
        return Err(EngineError::InvalidRange { earliest, latest });
    }
    let start = earliest.and_time(boundary);
    let end = latest
        .checked_add_days(Days::new(1))
        .ok_or(EngineError::InvalidRange { earliest, latest })?
        .and_time(boundary);
    Ok((start, end))
}

/// Returns the business day a timestamp belongs to.
///
/// Timestamps at or after the boundary time belong to their own calendar
/// date; timestamps before it belong to the previous date. This is the
/// inverse of [`resolve_range`] and is what per-day aggregation groups
/// by.
///
/// # Example
///
/// ```
/// use order_engine::business_day::{business_day_of, default_day_boundary};
/// use chrono::NaiveDate;
///
/// let late_night = NaiveDate::from_ymd_opt(2020, 6, 2)
///     .unwrap()
///     .and_hms_opt(1, 59, 59)
///     .unwrap();
/// assert_eq!(
///     business_day_of(late_night, default_day_boundary()),
///     NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
/// );
/// ```
pub fn business_day_of(ts: NaiveDateTime, boundary: NaiveTime) -> NaiveDate {
    if ts.time() < boundary {
        ts.date().pred_opt().unwrap_or_else(|| ts.date())
    } else {
        ts.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    /// BD-001: single-day range spans exactly one business day
    #[test]
    fn test_single_day_range() {
        let (start, end) =
            resolve_range(date("2020-06-01"), date("2020-06-01"), default_day_boundary())
                .unwrap();
        assert_eq!(start, datetime("2020-06-01 02:00:00"));
        assert_eq!(end, datetime("2020-06-02 02:00:00"));
    }

    /// BD-002: multi-day range ends the day after the latest date
    #[test]
    fn test_multi_day_range() {
        let (start, end) =
            resolve_range(date("2020-06-01"), date("2020-06-03"), default_day_boundary())
                .unwrap();
        assert_eq!(start, datetime("2020-06-01 02:00:00"));
        assert_eq!(end, datetime("2020-06-04 02:00:00"));
    }

    /// BD-003: inverted range is rejected before any fetch
    #[test]
    fn test_inverted_range_rejected() {
        let err = resolve_range(date("2020-06-02"), date("2020-06-01"), default_day_boundary())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange { .. }));
    }

    /// BD-004: custom boundary time is honored
    #[test]
    fn test_custom_boundary() {
        let boundary = NaiveTime::from_hms_opt(4, 30, 0).unwrap();
        let (start, end) =
            resolve_range(date("2020-06-01"), date("2020-06-01"), boundary).unwrap();
        assert_eq!(start, datetime("2020-06-01 04:30:00"));
        assert_eq!(end, datetime("2020-06-02 04:30:00"));
    }

    /// BD-005: an order at 01:59:59 belongs to the previous business day
    #[test]
    fn test_late_night_order_belongs_to_previous_day() {
        let ts = datetime("2020-06-02 01:59:59");
        assert_eq!(
            business_day_of(ts, default_day_boundary()),
            date("2020-06-01")
        );
    }

    /// BD-006: an order exactly at the boundary starts the new day
    #[test]
    fn test_boundary_instant_starts_new_day() {
        let ts = datetime("2020-06-02 02:00:00");
        assert_eq!(
            business_day_of(ts, default_day_boundary()),
            date("2020-06-02")
        );
    }

    /// BD-007: interval membership matches business_day_of
    #[test]
    fn test_interval_membership_matches_mapping() {
        let day = date("2020-06-01");
        let (start, end) = resolve_range(day, day, default_day_boundary()).unwrap();

        let inside = datetime("2020-06-02 01:59:59");
        assert!(start <= inside && inside < end);
        assert_eq!(business_day_of(inside, default_day_boundary()), day);

        let outside = datetime("2020-06-02 02:00:00");
        assert!(outside >= end);
        assert_ne!(business_day_of(outside, default_day_boundary()), day);
    }

    #[test]
    fn test_midnight_boundary_is_calendar_day() {
        let boundary = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let ts = datetime("2020-06-02 00:00:01");
        assert_eq!(business_day_of(ts, boundary), date("2020-06-02"));
    }
}
