//! Calendar-day boundaries under a single fixed UTC offset.
//!
//! Records are stamped with the UTC instant of local midnight and every read
//! queries the same `[start, end]` window, so a record's day never depends on
//! the server process's own timezone.

use crate::errors::ValidationError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Fixed offset east of UTC, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtcOffset(i32);

impl UtcOffset {
    /// UTC+5:30.
    pub const IST: UtcOffset = UtcOffset(330);

    pub fn from_minutes(minutes: i32) -> Result<Self, ValidationError> {
        if minutes.abs() >= MINUTES_PER_DAY {
            return Err(ValidationError::InvalidOffset(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self::IST
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Strict `YYYY-MM-DD` parse.
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// UTC instants of local 00:00:00.000 and 23:59:59.999 for `date`.
pub fn day_range(date: NaiveDate, offset: UtcOffset) -> DayRange {
    let start = date.and_time(NaiveTime::MIN).and_utc() - offset.duration();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    DayRange { start, end }
}

pub fn day_range_str(value: &str, offset: UtcOffset) -> Result<DayRange, ValidationError> {
    Ok(day_range(parse_day(value)?, offset))
}

/// Wall-clock reading of `instant` in the fixed offset.
pub fn local_datetime(instant: DateTime<Utc>, offset: UtcOffset) -> NaiveDateTime {
    instant.naive_utc() + offset.duration()
}

pub fn local_date(instant: DateTime<Utc>, offset: UtcOffset) -> NaiveDate {
    local_datetime(instant, offset).date()
}

/// Inverse of [`day_range`]: the calendar day `instant` falls on.
pub fn day_key(instant: DateTime<Utc>, offset: UtcOffset) -> String {
    date_key(local_date(instant, offset))
}

/// Every local calendar day from `start` to `end`, both included.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, ValidationError> {
    if start > end {
        return Err(ValidationError::InvalidRange {
            start: date_key(start),
            end: date_key(end),
        });
    }

    Ok(start.iter_days().take_while(|date| *date <= end).collect())
}

pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, ValidationError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ValidationError::InvalidMonth { year, month })?;

    Ok(first
        .iter_days()
        .take_while(|date| date.month() == month)
        .collect())
}

/// Time left until the next local midnight.
pub fn time_until_reset(now: DateTime<Utc>, offset: UtcOffset) -> Duration {
    let local = local_datetime(now, offset);
    let next_midnight = (local.date() + Duration::days(1)).and_time(NaiveTime::MIN);
    next_midnight - local
}

pub fn format_countdown(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn ist_day_range_starts_previous_utc_evening() {
        let range = day_range_str("2024-03-01", UtcOffset::IST).unwrap();
        assert_eq!(range.start, utc(2024, 2, 29, 18, 30, 0));
        assert_eq!(
            range.end,
            utc(2024, 3, 1, 18, 29, 59) + Duration::milliseconds(999)
        );
    }

    #[test]
    fn day_key_round_trips_day_range_start() {
        let offsets = [-720, -330, -1, 0, 1, 330, 345, 840];
        let days = ["2024-02-29", "2023-12-31", "2024-01-01", "2025-06-15"];
        for minutes in offsets {
            let offset = UtcOffset::from_minutes(minutes).unwrap();
            for day in days {
                let range = day_range_str(day, offset).unwrap();
                assert_eq!(day_key(range.start, offset), day, "offset {minutes}");
                assert_eq!(day_key(range.end, offset), day, "offset {minutes}");
            }
        }
    }

    #[test]
    fn instant_near_utc_midnight_belongs_to_next_local_day() {
        let late_evening = utc(2024, 5, 10, 19, 0, 0);
        assert_eq!(day_key(late_evening, UtcOffset::IST), "2024-05-11");
        assert_eq!(day_key(late_evening, UtcOffset::from_minutes(0).unwrap()), "2024-05-10");
    }

    #[test]
    fn parse_day_is_strict() {
        assert!(parse_day("2024-03-01").is_ok());
        for bad in ["2024-3-1", "2024/03/01", "2024-02-30", "", "20240301", " 2024-03-01"] {
            assert_eq!(
                parse_day(bad),
                Err(ValidationError::InvalidDate(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn offset_outside_one_day_is_rejected() {
        assert!(UtcOffset::from_minutes(1439).is_ok());
        assert_eq!(
            UtcOffset::from_minutes(-1440),
            Err(ValidationError::InvalidOffset(-1440))
        );
    }

    #[test]
    fn days_inclusive_steps_through_leap_day_and_year_end() {
        let start = parse_day("2024-02-27").unwrap();
        let end = parse_day("2024-03-01").unwrap();
        let keys: Vec<String> = days_inclusive(start, end)
            .unwrap()
            .into_iter()
            .map(date_key)
            .collect();
        assert_eq!(keys, ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);

        let days = days_inclusive(parse_day("2023-12-31").unwrap(), parse_day("2024-01-01").unwrap())
            .unwrap();
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn days_inclusive_rejects_reversed_range() {
        let err = days_inclusive(parse_day("2024-03-02").unwrap(), parse_day("2024-03-01").unwrap())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRange { .. }));
    }

    #[test]
    fn month_days_handles_february() {
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2023, 2).unwrap().len(), 28);
        assert_eq!(month_days(2024, 12).unwrap().len(), 31);
        assert!(month_days(2024, 13).is_err());
    }

    #[test]
    fn countdown_to_local_midnight() {
        // 17:00 UTC is 22:30 in IST.
        let remaining = time_until_reset(utc(2024, 3, 1, 17, 0, 0), UtcOffset::IST);
        assert_eq!(remaining, Duration::minutes(90));
        assert_eq!(format_countdown(remaining), "1h 30m");
    }
}
