//! Seasonal duration interpolation.
//!
//! Programs carry two extreme durations, one for the summer peak and one for
//! the winter peak. The duration actually used on a given date is a linear
//! blend of the two, weighted by how far the date sits between the peaks on
//! the year circle. On a peak date the extreme is returned exactly.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month/day boundary dates for one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDates {
    /// Month and day the season begins.
    pub start: (u32, u32),
    /// Month and day of the season's peak.
    pub peak: (u32, u32),
}

/// The two seasons the controller knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTable {
    pub summer: SeasonDates,
    pub winter: SeasonDates,
}

impl Default for SeasonTable {
    fn default() -> Self {
        Self {
            summer: SeasonDates {
                start: (5, 1),
                peak: (7, 15),
            },
            winter: SeasonDates {
                start: (11, 1),
                peak: (1, 15),
            },
        }
    }
}

/// Day-of-year of a month/day pair within `year`, clamped to a real date.
fn ordinal_of(year: i32, (month, day): (u32, u32)) -> u32 {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, day.saturating_sub(1)))
        .map(|d| d.ordinal())
        .unwrap_or(1)
}

/// Shortest distance between two days on the year circle.
fn circular_distance(a: u32, b: u32, year_len: u32) -> u32 {
    let diff = a.abs_diff(b);
    diff.min(year_len - diff)
}

/// Run duration for `date`, blended between the seasonal extremes.
pub fn duration_for(
    date: NaiveDate,
    summer_duration: Duration,
    winter_duration: Duration,
    seasons: &SeasonTable,
) -> Duration {
    let year_len = if date.leap_year() { 366 } else { 365 };
    let doy = date.ordinal();
    let summer_peak = ordinal_of(date.year(), seasons.summer.peak);
    let winter_peak = ordinal_of(date.year(), seasons.winter.peak);

    let to_summer = circular_distance(doy, summer_peak, year_len);
    let to_winter = circular_distance(doy, winter_peak, year_len);
    if to_summer + to_winter == 0 {
        // Degenerate table with both peaks on the same day.
        return summer_duration;
    }

    let summer_weight = to_winter as f64 / (to_summer + to_winter) as f64;
    let blended = winter_duration.num_seconds() as f64
        + (summer_duration.num_seconds() - winter_duration.num_seconds()) as f64 * summer_weight;
    Duration::seconds(blended.round() as i64)
}
