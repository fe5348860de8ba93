//! Program entity and time-of-day handling.
//!
//! A program is a recurring daily run window: a start time-of-day, a pump
//! speed, and a pair of seasonal durations that the interpolator blends
//! depending on the calendar date.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use thiserror::Error;

use super::types::{ProgramId, Speed};

/// Wire format for times-of-day and durations.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Errors raised when parsing program fields.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Time-of-day string was not HH:MM:SS.
    #[error("invalid time of day '{0}', expected HH:MM:SS")]
    InvalidTime(String),

    /// Duration string was not HH:MM:SS.
    #[error("invalid duration '{0}', expected HH:MM:SS")]
    InvalidDuration(String),

    /// Speed was not a non-negative integer.
    #[error("invalid speed '{0}'")]
    InvalidSpeed(String),
}

/// A recurring pump program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Database-assigned identifier.
    pub id: ProgramId,
    /// Pump speed while the program runs.
    pub speed: Speed,
    /// Daily start time (unique across programs, enforced by the store).
    pub start: NaiveTime,
    /// Run duration at the summer peak.
    pub summer_duration: Duration,
    /// Run duration at the winter peak.
    pub winter_duration: Duration,
}

impl Program {
    /// Next occurrence of this program's start time strictly after `after`.
    ///
    /// Either today at `start` if that is still ahead, or the same
    /// time-of-day tomorrow.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        next_occurrence_of(self.start, after)
    }
}

/// Next UTC instant at which `start` occurs, strictly after `after`.
pub fn next_occurrence_of(start: NaiveTime, after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive().and_time(start).and_utc();
    if today > after {
        today
    } else {
        (after.date_naive() + Duration::days(1))
            .and_time(start)
            .and_utc()
    }
}

/// Parse an HH:MM:SS time-of-day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ProgramError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| ProgramError::InvalidTime(s.to_string()))
}

/// Parse an HH:MM:SS duration (offset from midnight, so capped below 24h).
pub fn parse_duration_hms(s: &str) -> Result<Duration, ProgramError> {
    let t = NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|_| ProgramError::InvalidDuration(s.to_string()))?;
    Ok(Duration::seconds(t.num_seconds_from_midnight() as i64))
}

/// Format a duration back into HH:MM:SS.
pub fn format_duration_hms(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_time_of_day() {
        let t = parse_time_of_day("08:30:15").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(8, 30, 15).unwrap());
        assert!(parse_time_of_day("8:30").is_err());
        assert!(parse_time_of_day("25:00:00").is_err());
    }

    #[test]
    fn parses_and_formats_duration() {
        let d = parse_duration_hms("01:15:30").unwrap();
        assert_eq!(d, Duration::seconds(4530));
        assert_eq!(format_duration_hms(d), "01:15:30");
        assert!(parse_duration_hms("soon").is_err());
    }

    #[test]
    fn next_occurrence_today_when_still_ahead() {
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let next = next_occurrence_of(start, after);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow() {
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let next = next_occurrence_of(start, after);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn exact_start_time_rolls_forward() {
        // Strictly after, so an occurrence at the query instant is skipped.
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let next = next_occurrence_of(start, after);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap());
    }
}
