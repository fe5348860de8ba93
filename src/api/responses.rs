//! API response types.

use serde::Serialize;

use crate::core::program::{format_duration_hms, Program, TIME_FORMAT};
use crate::core::season::{SeasonDates, SeasonTable};

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A stored program, with times and durations in their wire format.
#[derive(Debug, Serialize)]
pub struct ProgramResponse {
    pub id: i64,
    pub speed: u32,
    pub start: String,
    pub summer_duration: String,
    pub winter_duration: String,
}

impl From<Program> for ProgramResponse {
    fn from(program: Program) -> Self {
        Self {
            id: program.id.as_i64(),
            speed: program.speed,
            start: program.start.format(TIME_FORMAT).to_string(),
            summer_duration: format_duration_hms(program.summer_duration),
            winter_duration: format_duration_hms(program.winter_duration),
        }
    }
}

/// Boundary dates for one season, `MM-DD` strings.
#[derive(Debug, Serialize)]
pub struct SeasonDatesResponse {
    pub start: String,
    pub peak: String,
}

impl From<SeasonDates> for SeasonDatesResponse {
    fn from(dates: SeasonDates) -> Self {
        Self {
            start: format!("{:02}-{:02}", dates.start.0, dates.start.1),
            peak: format!("{:02}-{:02}", dates.peak.0, dates.peak.1),
        }
    }
}

/// Season boundary dates response.
#[derive(Debug, Serialize)]
pub struct SeasonsResponse {
    pub summer: SeasonDatesResponse,
    pub winter: SeasonDatesResponse,
}

impl From<SeasonTable> for SeasonsResponse {
    fn from(table: SeasonTable) -> Self {
        Self {
            summer: table.summer.into(),
            winter: table.winter.into(),
        }
    }
}
